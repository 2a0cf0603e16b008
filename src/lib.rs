// src/lib.rs

//! Google Play rank collection library

pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
