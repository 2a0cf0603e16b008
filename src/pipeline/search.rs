// src/pipeline/search.rs

//! Free-text search passthrough.

use crate::error::Result;
use crate::services::{AppSource, SearchQuery};

/// Run one search and render the raw payload as a single JSON document.
///
/// The payload is not interpreted. Whatever the provider returned is
/// serialized back compactly for the caller to print or pipe.
pub async fn run_search(source: &dyn AppSource, query: &SearchQuery) -> Result<String> {
    let payload = source.search(query).await?;
    Ok(serde_json::to_string(&payload)?)
}
