//! Metrics module for Shelf.

pub mod cache;
pub mod http;
pub mod setup;

pub use cache::{CacheMetrics, record_warmup_run};
pub use setup::init_metrics;
