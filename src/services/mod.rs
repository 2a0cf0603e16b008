// src/services/mod.rs

//! External service adapters.

pub mod source;

pub use source::{AppSource, DeveloperQuery, HttpAppSource, ListQuery, SearchQuery};
