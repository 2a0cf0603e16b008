// src/storage/ndjson.rs

//! Append-only NDJSON partitions.
//!
//! One output file per country. Every run appends; nothing is rewritten,
//! so repeated runs accumulate history in place.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Result of one append call.
#[derive(Debug)]
pub struct AppendSummary {
    pub path: PathBuf,
    pub records: usize,
}

/// Append-only NDJSON sink partitioned by country.
pub struct NdjsonSink {
    output_dir: PathBuf,
}

impl NdjsonSink {
    /// Create a sink rooted at the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Partition file for a country.
    pub fn partition_path(&self, country: &str) -> PathBuf {
        self.output_dir.join(format!("ranks-{country}.jsonl"))
    }

    /// Append one batch of records to a country partition.
    ///
    /// Records are serialized one JSON document per line and written in a
    /// single append. An empty batch leaves the partition untouched.
    pub async fn append<T: Serialize>(
        &self,
        records: &[T],
        country: &str,
    ) -> Result<AppendSummary> {
        let path = self.partition_path(country);
        if records.is_empty() {
            return Ok(AppendSummary { path, records: 0 });
        }

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        append_bytes(&path, buffer.as_bytes())
            .await
            .map_err(|error| AppError::sink(&path, error))?;

        Ok(AppendSummary {
            path,
            records: records.len(),
        })
    }
}

/// Open the partition in append mode and write the whole batch at once.
async fn append_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_accumulates_batches() {
        let tmp = TempDir::new().unwrap();
        let sink = NdjsonSink::new(tmp.path());

        sink.append(&[json!({"rank": 1}), json!({"rank": 2})], "us")
            .await
            .unwrap();
        sink.append(&[json!({"rank": 3})], "us").await.unwrap();

        let content = tokio::fs::read_to_string(sink.partition_path("us"))
            .await
            .unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"{"rank":1}"#);
        assert_eq!(lines[2], r#"{"rank":3}"#);
        assert!(content.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_empty_batch_leaves_partition_untouched() {
        let tmp = TempDir::new().unwrap();
        let sink = NdjsonSink::new(tmp.path());

        let summary = sink.append::<serde_json::Value>(&[], "us").await.unwrap();
        assert_eq!(summary.records, 0);
        assert!(!sink.partition_path("us").exists());
    }

    #[tokio::test]
    async fn test_partitions_by_country() {
        let tmp = TempDir::new().unwrap();
        let sink = NdjsonSink::new(tmp.path());

        sink.append(&[json!({"c": "us"})], "us").await.unwrap();
        sink.append(&[json!({"c": "de"})], "de").await.unwrap();

        assert!(sink.partition_path("us").exists());
        assert!(sink.partition_path("de").exists());
        let us = tokio::fs::read_to_string(sink.partition_path("us"))
            .await
            .unwrap();
        assert_eq!(us, "{\"c\":\"us\"}\n");
    }

    #[tokio::test]
    async fn test_write_failure_reports_sink_error() {
        let tmp = TempDir::new().unwrap();
        let sink = NdjsonSink::new(tmp.path());
        // A directory squatting on the partition path makes the open fail.
        tokio::fs::create_dir_all(sink.partition_path("us"))
            .await
            .unwrap();

        let error = sink.append(&[json!({"rank": 1})], "us").await.unwrap_err();
        assert!(matches!(error, AppError::Sink { .. }));
        assert!(error.is_fatal());
    }
}
