//! Redis backend.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Pool, PoolConfig, Runtime, Timeouts};
use serde::Deserialize;
use tracing::debug;

use super::{CacheBackend, StoreError};

/// Redis connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Use Redis (falls back to the memory backend without it).
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379").
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Prefix of every cache key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Connection pool size.
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Timeout in milliseconds for pool checkout and for every cache operation.
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_enabled() -> bool {
    true
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "vendure".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

impl RedisConfig {
    /// Operation timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Backend over a pooled Redis connection.
///
/// Commands used: `GET`, `SET key value EX ttl`, `DEL key...`, `KEYS pattern`.
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Builds the connection pool. No connection is opened yet.
    ///
    /// Checkout, connect and recycle are all bounded by `timeout_ms`.
    pub fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        // from_url leaves the pool section unset
        let timeout = Some(config.timeout());
        redis_config.pool = Some(PoolConfig {
            max_size: config.pool_size,
            timeouts: Timeouts {
                wait: timeout,
                create: timeout,
                recycle: timeout,
            },
            ..PoolConfig::default()
        });

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        // EX takes whole seconds and rejects 0
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await?;
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pool.get().await?;
        let keys: Vec<String> = conn.keys(pattern).await?;
        debug!(pattern = %pattern, count = keys.len(), "Redis KEYS");
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.pool.get().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }

    fn close(&self) {
        self.pool.close();
    }
}
