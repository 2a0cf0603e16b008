// src/pipeline/developers.rs

//! Developer catalog expansion.
//!
//! Grows a seed list of developer ids into the deduplicated set of app
//! ids those developers publish.

use crate::error::Result;
use crate::models::{AppIdSet, CollectConfig, PathsConfig, app_id};
use crate::services::{AppSource, DeveloperQuery};
use crate::storage::{app_ids_path, load_developer_ids, write_app_ids};

/// Outcome of one expansion run.
#[derive(Debug, Default)]
pub struct ExpansionOutcome {
    pub app_ids: AppIdSet,
    pub developers: usize,
    pub failed_queries: usize,
    pub skipped_catalogs: usize,
}

/// Expand developer ids into a deduplicated app-id set.
///
/// One query per developer, in input order. Failures and shapeless
/// payloads are logged and skipped. Catalogs with one or fewer app ids
/// are dropped whole, including that one id.
pub async fn expand_developers(
    source: &dyn AppSource,
    developer_ids: &[String],
    country: &str,
    num: u32,
) -> ExpansionOutcome {
    let mut outcome = ExpansionOutcome {
        developers: developer_ids.len(),
        ..ExpansionOutcome::default()
    };

    for dev_id in developer_ids {
        log::info!("devId={dev_id}: start");
        let query = DeveloperQuery {
            dev_id: dev_id.clone(),
            num,
            country: country.to_string(),
        };

        let payload = match source.developer(&query).await {
            Ok(payload) => payload,
            Err(error) => {
                log::error!("Error fetching apps for developer {dev_id}: {error}");
                outcome.failed_queries += 1;
                continue;
            }
        };

        let Some(items) = payload.as_array() else {
            log::error!("Error fetching apps for developer {dev_id}: unexpected payload shape");
            outcome.failed_queries += 1;
            continue;
        };

        let ids: Vec<String> = items
            .iter()
            .filter_map(app_id)
            .map(str::to_string)
            .collect();
        if ids.len() > 1 {
            let added = outcome.app_ids.extend(ids);
            log::info!("devId={dev_id}: added {added}");
        } else {
            // Single-result catalogs are a provider quirk: usually a
            // placeholder response, not a real one-app developer.
            log::info!("devId={dev_id}: no appIds found");
            outcome.skipped_catalogs += 1;
        }
    }

    outcome
}

/// Run the expansion end to end: load seeds, expand, persist.
///
/// The output file is written once, after the whole expansion, and only
/// when at least one app id was collected.
pub async fn run_developers(
    source: &dyn AppSource,
    paths: &PathsConfig,
    collect: &CollectConfig,
) -> Result<ExpansionOutcome> {
    let developer_ids = load_developer_ids(&paths.developers_file).await?;
    log::info!(
        "Loaded {} developer ids from {:?}",
        developer_ids.len(),
        paths.developers_file
    );

    let outcome = expand_developers(
        source,
        &developer_ids,
        &collect.country,
        collect.developer_num_apps,
    )
    .await;

    log::info!(
        "Expansion finished: {} developers ({} failed, {} skipped), {} unique app ids",
        outcome.developers,
        outcome.failed_queries,
        outcome.skipped_catalogs,
        outcome.app_ids.len()
    );

    if outcome.app_ids.is_empty() {
        log::info!("No app ids collected. Output file left untouched.");
        return Ok(outcome);
    }

    let path = app_ids_path(&paths.output_dir, &collect.country);
    write_app_ids(&path, outcome.app_ids.as_slice()).await?;
    log::info!("Wrote {} app ids to {:?}", outcome.app_ids.len(), path);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::source::StubSource;
    use serde_json::json;
    use tempfile::TempDir;

    fn seed(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_duplicate_app_ids_collapse_across_developers() {
        let source = StubSource::new(vec![
            Ok(json!([{"appId": "com.a"}, {"appId": "com.b"}])),
            Ok(json!([{"appId": "com.b"}, {"appId": "com.c"}])),
        ]);

        let outcome = expand_developers(&source, &seed(&["dev.one", "dev.two"]), "us", 60).await;

        assert_eq!(outcome.app_ids.as_slice(), ["com.a", "com.b", "com.c"]);
        assert_eq!(outcome.failed_queries, 0);
    }

    #[tokio::test]
    async fn test_small_catalogs_are_excluded_whole() {
        let source = StubSource::new(vec![
            Ok(json!([{"appId": "com.lonely"}])),
            Ok(json!([])),
            Ok(json!([{"appId": "com.a"}, {"appId": "com.b"}])),
        ]);

        let outcome =
            expand_developers(&source, &seed(&["dev.one", "dev.two", "dev.three"]), "us", 60)
                .await;

        assert_eq!(outcome.app_ids.as_slice(), ["com.a", "com.b"]);
        assert_eq!(outcome.skipped_catalogs, 2);
        assert!(!outcome.app_ids.contains("com.lonely"));
    }

    #[tokio::test]
    async fn test_failed_developer_is_skipped_and_run_continues() {
        let source = StubSource::new(vec![
            Err(AppError::source("developer dev.one", "HTTP 500")),
            Ok(json!({"message": "not found"})),
            Ok(json!([{"appId": "com.a"}, {"appId": "com.b"}])),
        ]);

        let outcome =
            expand_developers(&source, &seed(&["dev.one", "dev.two", "dev.three"]), "us", 60)
                .await;

        assert_eq!(outcome.failed_queries, 2);
        assert_eq!(outcome.app_ids.len(), 2);
        assert_eq!(
            source.recorded_calls(),
            vec![
                "developer dev.one",
                "developer dev.two",
                "developer dev.three",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_writes_deduplicated_ids_once() {
        let tmp = TempDir::new().unwrap();
        let paths = PathsConfig {
            output_dir: tmp.path().join("out"),
            developers_file: tmp.path().join("developers.txt"),
        };
        tokio::fs::write(&paths.developers_file, "dev.one\ndev.two\n")
            .await
            .unwrap();

        let source = StubSource::new(vec![
            Ok(json!([{"appId": "com.a"}, {"appId": "com.b"}])),
            Ok(json!([{"appId": "com.a"}, {"appId": "com.c"}])),
        ]);

        let outcome = run_developers(&source, &paths, &CollectConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.app_ids.len(), 3);
        let content = tokio::fs::read_to_string(app_ids_path(&paths.output_dir, "us"))
            .await
            .unwrap();
        assert_eq!(content, "com.a\ncom.b\ncom.c\n");
    }

    #[tokio::test]
    async fn test_run_excludes_single_result_catalogs_from_output() {
        let tmp = TempDir::new().unwrap();
        let paths = PathsConfig {
            output_dir: tmp.path().join("out"),
            developers_file: tmp.path().join("developers.txt"),
        };
        tokio::fs::write(&paths.developers_file, "d1\nd2\n")
            .await
            .unwrap();

        let source = StubSource::new(vec![
            Ok(json!([{"appId": "x"}])),
            Ok(json!([{"appId": "y"}, {"appId": "z"}])),
        ]);

        let outcome = run_developers(&source, &paths, &CollectConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.skipped_catalogs, 1);
        assert_eq!(outcome.app_ids.as_slice(), ["y", "z"]);
        let content = tokio::fs::read_to_string(app_ids_path(&paths.output_dir, "us"))
            .await
            .unwrap();
        assert_eq!(content, "y\nz\n");
    }

    #[tokio::test]
    async fn test_run_leaves_output_untouched_when_nothing_collected() {
        let tmp = TempDir::new().unwrap();
        let paths = PathsConfig {
            output_dir: tmp.path().join("out"),
            developers_file: tmp.path().join("developers.txt"),
        };
        tokio::fs::write(&paths.developers_file, "dev.one\n")
            .await
            .unwrap();

        let source = StubSource::new(vec![Ok(json!([{"appId": "com.lonely"}]))]);

        let outcome = run_developers(&source, &paths, &CollectConfig::default())
            .await
            .unwrap();

        assert!(outcome.app_ids.is_empty());
        assert!(!app_ids_path(&paths.output_dir, "us").exists());
    }

    #[tokio::test]
    async fn test_run_without_input_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let paths = PathsConfig {
            output_dir: tmp.path().join("out"),
            developers_file: tmp.path().join("missing.txt"),
        };

        let source = StubSource::new(vec![]);
        let error = run_developers(&source, &paths, &CollectConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::Input(_)));
        assert!(error.is_fatal());
    }
}
