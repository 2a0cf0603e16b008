//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// External source service settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Collection run settings (country, limits, grid)
    #[serde(default)]
    pub collect: CollectConfig,

    /// Input/output file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if the file does not exist.
    ///
    /// A present-but-malformed file is still an error: silently ignoring
    /// it would run a long collection job with the wrong settings.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("No config file at {:?}. Using defaults.", path);
            Ok(Self::default())
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::config("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::config("source.timeout_secs must be > 0"));
        }
        if self.source.retry_attempts == 0 {
            return Err(AppError::config("source.retry_attempts must be > 0"));
        }
        if url::Url::parse(&self.source.base_url).is_err() {
            return Err(AppError::config(format!(
                "source.base_url is not a valid URL: {}",
                self.source.base_url
            )));
        }
        if !is_locale_code(&self.collect.country) {
            return Err(AppError::config(format!(
                "collect.country must be a two-letter code, got {:?}",
                self.collect.country
            )));
        }
        if self.collect.num_apps == 0 {
            return Err(AppError::config("collect.num_apps must be > 0"));
        }
        if self.collect.developer_num_apps == 0 {
            return Err(AppError::config("collect.developer_num_apps must be > 0"));
        }
        if self.collect.categories.is_empty() {
            return Err(AppError::config("No categories defined"));
        }
        if self.collect.collections.is_empty() {
            return Err(AppError::config("No collections defined"));
        }
        for token in self
            .collect
            .categories
            .iter()
            .chain(&self.collect.collections)
        {
            if !is_grid_token(token) {
                return Err(AppError::config(format!(
                    "Invalid category/collection token: {:?}",
                    token
                )));
            }
        }
        Ok(())
    }
}

/// External source service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the scraper service wrapping the store
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Attempts per query before giving up (first try included)
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff between retries in milliseconds (grows linearly)
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retry_attempts: defaults::retry_attempts(),
            retry_backoff_ms: defaults::retry_backoff(),
        }
    }
}

/// Collection run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    /// Two-letter country code charts are requested for
    #[serde(default = "defaults::country")]
    pub country: String,

    /// Apps pulled per category per collection
    #[serde(default = "defaults::num_apps")]
    pub num_apps: u32,

    /// Apps pulled per developer in developer mode
    #[serde(default = "defaults::developer_num_apps")]
    pub developer_num_apps: u32,

    /// Optional delay between list queries in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Category tokens forming the outer iteration dimension
    #[serde(default = "defaults::categories")]
    pub categories: Vec<String>,

    /// Collection tokens forming the inner iteration dimension
    #[serde(default = "defaults::collections")]
    pub collections: Vec<String>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            country: defaults::country(),
            num_apps: defaults::num_apps(),
            developer_num_apps: defaults::developer_num_apps(),
            request_delay_ms: 0,
            categories: defaults::categories(),
            collections: defaults::collections(),
        }
    }
}

/// Input/output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory output partitions are written into
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// Newline-delimited developer-id input file
    #[serde(default = "defaults::developers_file")]
    pub developers_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            developers_file: defaults::developers_file(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level written out ("debug", "info", "warn", "error")
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Append-mode log file duplicating console output; none disables it
    #[serde(default = "defaults::log_file")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: defaults::log_file(),
        }
    }
}

/// Whether a string is a two-letter lowercase locale/country code.
pub fn is_locale_code(code: &str) -> bool {
    // Compiled per call; validation runs once at startup.
    regex::Regex::new(r"^[a-z]{2}$")
        .map(|re| re.is_match(code))
        .unwrap_or(false)
}

/// Whether a string is a well-formed category/collection token.
pub fn is_grid_token(token: &str) -> bool {
    regex::Regex::new(r"^[A-Z][A-Z0-9_]*$")
        .map(|re| re.is_match(token))
        .unwrap_or(false)
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn base_url() -> String {
        "http://localhost:3000/api".into()
    }
    pub fn user_agent() -> String {
        "playranks/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn retry_attempts() -> u32 {
        3
    }
    pub fn retry_backoff() -> u64 {
        500
    }

    // Collect defaults
    pub fn country() -> String {
        "us".into()
    }
    pub fn num_apps() -> u32 {
        500
    }
    pub fn developer_num_apps() -> u32 {
        60
    }

    // Path defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn developers_file() -> PathBuf {
        PathBuf::from("data/developers.txt")
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn log_file() -> Option<PathBuf> {
        Some(PathBuf::from("logs/playranks.log"))
    }

    /// Store category tokens, in the provider's declaration order.
    pub fn categories() -> Vec<String> {
        [
            "APPLICATION",
            "ANDROID_WEAR",
            "ART_AND_DESIGN",
            "AUTO_AND_VEHICLES",
            "BEAUTY",
            "BOOKS_AND_REFERENCE",
            "BUSINESS",
            "COMICS",
            "COMMUNICATION",
            "DATING",
            "EDUCATION",
            "ENTERTAINMENT",
            "EVENTS",
            "FINANCE",
            "FOOD_AND_DRINK",
            "HEALTH_AND_FITNESS",
            "HOUSE_AND_HOME",
            "LIBRARIES_AND_DEMO",
            "LIFESTYLE",
            "MAPS_AND_NAVIGATION",
            "MEDICAL",
            "MUSIC_AND_AUDIO",
            "NEWS_AND_MAGAZINES",
            "PARENTING",
            "PERSONALIZATION",
            "PHOTOGRAPHY",
            "PRODUCTIVITY",
            "SHOPPING",
            "SOCIAL",
            "SPORTS",
            "TOOLS",
            "TRAVEL_AND_LOCAL",
            "VIDEO_PLAYERS",
            "WATCH_FACE",
            "WEATHER",
            "GAME",
            "GAME_ACTION",
            "GAME_ADVENTURE",
            "GAME_ARCADE",
            "GAME_BOARD",
            "GAME_CARD",
            "GAME_CASINO",
            "GAME_CASUAL",
            "GAME_EDUCATIONAL",
            "GAME_MUSIC",
            "GAME_PUZZLE",
            "GAME_RACING",
            "GAME_ROLE_PLAYING",
            "GAME_SIMULATION",
            "GAME_SPORTS",
            "GAME_STRATEGY",
            "GAME_TRIVIA",
            "GAME_WORD",
            "FAMILY",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Store ranking buckets.
    pub fn collections() -> Vec<String> {
        ["TOP_FREE", "TOP_PAID", "GROSSING"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_grid_dimensions() {
        let config = Config::default();
        assert_eq!(config.collect.categories.len(), 54);
        assert_eq!(config.collect.collections.len(), 3);
        assert_eq!(config.collect.num_apps, 500);
        assert_eq!(config.collect.developer_num_apps, 60);
        assert_eq!(config.collect.country, "us");
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.source.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_country() {
        let mut config = Config::default();
        config.collect.country = "usa".to_string();
        assert!(config.validate().is_err());
        config.collect.country = "US".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.source.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_grid_token() {
        let mut config = Config::default();
        config.collect.collections = vec!["top free".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.collect.num_apps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.retry_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [collect]
            country = "de"
            num_apps = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.collect.country, "de");
        assert_eq!(config.collect.num_apps, 100);
        assert_eq!(config.collect.categories.len(), 54);
        assert_eq!(config.source.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn locale_code_check() {
        assert!(is_locale_code("us"));
        assert!(is_locale_code("kr"));
        assert!(!is_locale_code("USA"));
        assert!(!is_locale_code("u"));
        assert!(!is_locale_code(""));
    }
}
