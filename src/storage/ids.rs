// src/storage/ids.rs

//! Developer-id input and app-id output files.
//!
//! Input is one developer id per line; blanks are skipped. Output is the
//! deduplicated app-id list, replaced wholesale on every run.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Load newline-delimited developer ids.
///
/// A missing or unreadable file is an input error; a run over developers
/// cannot start without it.
pub async fn load_developer_ids(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|error| {
        AppError::input(format!("cannot read developer ids from {path:?}: {error}"))
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// App-id output file for a country.
pub fn app_ids_path(output_dir: &Path, country: &str) -> PathBuf {
    output_dir.join(format!("developer-app-ids-{country}.txt"))
}

/// Write collected app ids, one per line.
pub async fn write_app_ids(path: &Path, ids: &[String]) -> Result<()> {
    let mut content = ids.join("\n");
    content.push('\n');
    write_bytes(path, content.as_bytes())
        .await
        .map_err(|error| AppError::sink(path, error))
}

/// Write bytes atomically (write to temp, then rename).
async fn write_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
