// src/services/source.rs

//! External app store source.
//!
//! All store access goes through the [`AppSource`] trait. The HTTP
//! implementation talks to a scraper service that wraps the store and
//! returns provider payloads as raw JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Parameters for a ranked list query.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub category: String,
    pub collection: String,
    pub num: u32,
    pub country: String,
}

/// Parameters for a developer catalog query.
#[derive(Debug, Clone)]
pub struct DeveloperQuery {
    pub dev_id: String,
    pub num: u32,
    pub country: String,
}

/// Parameters for a free-text search query.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub term: String,
    pub num: u32,
    pub country: String,
    pub lang: Option<String>,
}

/// Opaque query interface over the app store.
///
/// Payload shape is the provider's business; callers inspect the raw
/// JSON and decide what to make of surprises.
#[async_trait]
pub trait AppSource: Send + Sync {
    /// Fetch a ranked app list for one category and collection.
    async fn list(&self, query: &ListQuery) -> Result<Value>;

    /// Fetch the published app catalog of a single developer.
    async fn developer(&self, query: &DeveloperQuery) -> Result<Value>;

    /// Fetch search results for a free-text term.
    async fn search(&self, query: &SearchQuery) -> Result<Value>;
}

/// HTTP-backed source talking to a scraper service.
#[derive(Debug)]
pub struct HttpAppSource {
    client: Client,
    base_url: Url,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl HttpAppSource {
    /// Create a source from the configured service settings.
    ///
    /// Settings the client itself rejects (e.g. a user agent that is not
    /// a valid header value) are configuration errors, so they abort the
    /// run before any query is made.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AppError::config(format!("cannot build HTTP client: {error}")))?;
        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            client,
            base_url,
            retry_attempts: config.retry_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// Build an endpoint URL under the base, percent-encoding segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::config(format!("base URL cannot carry a path: {}", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Fetch a URL as JSON, retrying transient failures.
    ///
    /// Backoff grows linearly with the attempt number. The final failure
    /// is wrapped as a source error carrying the query context.
    async fn fetch_json(&self, url: Url, context: &str) -> Result<Value> {
        let mut attempt: u32 = 1;
        loop {
            match self.try_fetch(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.retry_attempts && is_transient(&error) => {
                    log::warn!("{context}: attempt {attempt} failed: {error}. Retrying.");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(error) => return Err(AppError::source(context, error)),
            }
        }
    }

    async fn try_fetch(&self, url: Url) -> Result<Value> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AppSource for HttpAppSource {
    async fn list(&self, query: &ListQuery) -> Result<Value> {
        let mut url = self.endpoint(&["apps"])?;
        url.query_pairs_mut()
            .append_pair("category", &query.category)
            .append_pair("collection", &query.collection)
            .append_pair("num", &query.num.to_string())
            .append_pair("country", &query.country);
        let context = format!(
            "list {}/{}/{}",
            query.category, query.collection, query.country
        );
        self.fetch_json(url, &context).await
    }

    async fn developer(&self, query: &DeveloperQuery) -> Result<Value> {
        let mut url = self.endpoint(&["developers", &query.dev_id])?;
        url.query_pairs_mut()
            .append_pair("num", &query.num.to_string())
            .append_pair("country", &query.country);
        let context = format!("developer {}", query.dev_id);
        self.fetch_json(url, &context).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Value> {
        let mut url = self.endpoint(&["apps"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.term)
                .append_pair("num", &query.num.to_string())
                .append_pair("country", &query.country);
            if let Some(lang) = &query.lang {
                pairs.append_pair("lang", lang);
            }
        }
        let context = format!("search {:?}", query.term);
        self.fetch_json(url, &context).await
    }
}

/// Whether a failed attempt is worth retrying.
fn is_transient(error: &AppError) -> bool {
    match error {
        AppError::Http(error) => {
            if error.is_timeout() || error.is_connect() {
                return true;
            }
            match error.status() {
                Some(status) => {
                    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                }
                None => false,
            }
        }
        _ => false,
    }
}

/// Scripted source for pipeline tests. Responses are consumed in call
/// order; calls are recorded for assertions on query sequencing.
#[cfg(test)]
pub(crate) struct StubSource {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<Value>>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl StubSource {
    pub(crate) fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: String) -> Result<Value> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Array(Vec::new())))
    }
}

#[cfg(test)]
#[async_trait]
impl AppSource for StubSource {
    async fn list(&self, query: &ListQuery) -> Result<Value> {
        self.next(format!("list {}/{}", query.category, query.collection))
    }

    async fn developer(&self, query: &DeveloperQuery) -> Result<Value> {
        self.next(format!("developer {}", query.dev_id))
    }

    async fn search(&self, query: &SearchQuery) -> Result<Value> {
        self.next(format!("search {}", query.term))
    }
}
