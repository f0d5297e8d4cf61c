//! Key-value backends behind the cache store.
//!
//! A backend only moves strings: serialization, timeouts and failure
//! handling live in [`CacheStore`](crate::cache::CacheStore). Backends report
//! every failure as a [`StoreError`]; the store decides what it means.

mod memory;
mod redis;

pub use memory::MemoryBackend;
pub use redis::{RedisBackend, RedisConfig};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Error del backend de cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("operation '{operation}' timed out after {millis}ms")]
    Timeout { operation: &'static str, millis: u64 },

    #[error("invalid key pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl From<deadpool_redis::PoolError> for StoreError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        StoreError::Pool(err.to_string())
    }
}

/// A string-keyed, TTL-aware key-value store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Reads a value. `Ok(None)` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value with an expiry, replacing any previous value.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Deletes keys. Returns how many existed. Absent keys are not an error.
    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// Lists keys matching a glob pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short name used in logs and health output.
    fn name(&self) -> &'static str;

    /// Releases connections. The backend must not be used afterwards.
    fn close(&self) {}
}
