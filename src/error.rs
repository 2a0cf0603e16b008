// src/error.rs

//! Unified error handling for the rank-collection pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad run input (missing developer-id file, malformed arguments)
    #[error("Input error: {0}")]
    Input(String),

    /// A query against the external app source failed
    #[error("Source error for {context}: {message}")]
    Source { context: String, message: String },

    /// Appending to an output partition failed
    #[error("Sink write error for {path:?}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create a source error with the query context it belongs to.
    pub fn source(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Source {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a sink error for an output partition path.
    pub fn sink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Sink {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must terminate the process with a failure code.
    ///
    /// Configuration/input problems abort before a run begins and sink
    /// failures abort mid-run; everything else that reaches the top level
    /// is logged and the process still exits cleanly.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Toml(_) | Self::Config(_) | Self::Input(_) | Self::Sink { .. }
        )
    }
}
