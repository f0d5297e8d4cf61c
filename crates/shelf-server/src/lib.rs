//! Shelf Server - read-through catalog cache over HTTP
//!
//! Serves products and variants from a Redis (or in-memory) cache, filling
//! misses from the source of record. Lifecycle events invalidate and
//! repopulate entries; a background warmup keeps the cache loaded.

pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod state;
pub mod warmup;

pub use cache::{CacheStore, EntityCache, InvalidationListener, connect_store};
pub use config::{AppConfig, ConfigError, load_config};
pub use error::AppError;
pub use server::{create_app_router, create_router, run_server};
pub use state::AppState;
pub use warmup::{CacheWarmer, WarmupScheduler};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
