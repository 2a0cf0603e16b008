// src/storage/mod.rs

//! Input and output file handling.

pub mod ids;
pub mod ndjson;

pub use ids::{app_ids_path, load_developer_ids, write_app_ids};
pub use ndjson::{AppendSummary, NdjsonSink};
