// src/models/mod.rs

//! Data model definitions.

pub mod config;
pub mod record;

pub use config::{CollectConfig, Config, LoggingConfig, PathsConfig, SourceConfig, is_locale_code};
pub use record::{AppIdSet, RankRecord, STORE_GOOGLE_PLAY, app_id};
