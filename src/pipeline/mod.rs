// src/pipeline/mod.rs

//! Collection pipeline stages.

pub mod developers;
pub mod ranks;
pub mod search;

pub use developers::{ExpansionOutcome, expand_developers, run_developers};
pub use ranks::{RankRunStats, collect_ranks, run_ranks};
pub use search::run_search;
