// src/pipeline/ranks.rs

//! Ranked chart collection.
//!
//! Walks the category/collection grid sequentially and appends one batch
//! of rank records per category to the country partition.

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::models::{CollectConfig, RankRecord, STORE_GOOGLE_PLAY, app_id};
use crate::services::{AppSource, ListQuery};
use crate::storage::NdjsonSink;

/// Counters for one grid run.
#[derive(Debug, Default)]
pub struct RankRunStats {
    pub queries: usize,
    pub failed_queries: usize,
    pub no_data_queries: usize,
    pub records: usize,
    pub batches: usize,
}

enum ListOutcome {
    Ranked,
    NoData,
    Failed,
}

/// Collect the ranked chart for one category/collection pair.
///
/// Source failures are absorbed: they log and yield an empty chart so
/// the surrounding run keeps going. Empty or non-sequence payloads
/// count as "no data", not as errors. Entries without an app id are
/// dropped; the positions of later entries are kept, so ranks may have
/// gaps but never shift.
pub async fn collect_ranks(
    source: &dyn AppSource,
    category: &str,
    collection: &str,
    country: &str,
    num: u32,
) -> Vec<RankRecord> {
    collect_with_outcome(source, category, collection, country, num)
        .await
        .0
}

async fn collect_with_outcome(
    source: &dyn AppSource,
    category: &str,
    collection: &str,
    country: &str,
    num: u32,
) -> (Vec<RankRecord>, ListOutcome) {
    let query = ListQuery {
        category: category.to_string(),
        collection: collection.to_string(),
        num,
        country: country.to_string(),
    };

    let payload = match source.list(&query).await {
        Ok(payload) => payload,
        Err(error) => {
            log::error!("{error}");
            return (Vec::new(), ListOutcome::Failed);
        }
    };

    let items = match payload.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            log::warn!(
                "No results for category={category}, collection={collection}, country={country}"
            );
            return (Vec::new(), ListOutcome::NoData);
        }
    };

    let crawled_date = Utc::now().date_naive();
    let records = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let store_id = app_id(item)?;
            Some(RankRecord {
                crawled_date,
                store: STORE_GOOGLE_PLAY,
                country: country.to_string(),
                collection: collection.to_string(),
                category: category.to_string(),
                rank: index as u32 + 1,
                store_id: store_id.to_string(),
            })
        })
        .collect();

    (records, ListOutcome::Ranked)
}

/// Walk the whole grid and append one batch per category.
///
/// Iteration is sequential in configured order. A category whose batch
/// comes out empty is skipped without touching the partition. Append
/// failures are the only errors that escape.
pub async fn run_ranks(
    source: &dyn AppSource,
    sink: &NdjsonSink,
    collect: &CollectConfig,
) -> Result<RankRunStats> {
    let mut stats = RankRunStats::default();
    log::info!(
        "Starting {} categories and {} collections",
        collect.categories.len(),
        collect.collections.len()
    );

    for category in &collect.categories {
        let mut batch: Vec<RankRecord> = Vec::new();

        for collection in &collect.collections {
            log::info!("Category: {category}, Collection: {collection}");
            let (records, outcome) = collect_with_outcome(
                source,
                category,
                collection,
                &collect.country,
                collect.num_apps,
            )
            .await;

            stats.queries += 1;
            match outcome {
                ListOutcome::Failed => stats.failed_queries += 1,
                ListOutcome::NoData => stats.no_data_queries += 1,
                ListOutcome::Ranked => {}
            }
            batch.extend(records);

            if collect.request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(collect.request_delay_ms)).await;
            }
        }

        if batch.is_empty() {
            log::info!("No records collected for category {category}");
            continue;
        }

        let summary = sink.append(&batch, &collect.country).await?;
        log::info!("Appended {} records to {:?}", summary.records, summary.path);
        stats.records += summary.records;
        stats.batches += 1;
    }

    log::info!(
        "Grid run finished: {} queries ({} failed, {} without results), {} records in {} batches",
        stats.queries,
        stats.failed_queries,
        stats.no_data_queries,
        stats.records,
        stats.batches
    );
    Ok(stats)
}
