//! In-process backend using Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use glob::Pattern;
use moka::Expiry;
use moka::future::Cache;

use super::{CacheBackend, StoreError};
use crate::metrics::CacheMetrics;

/// Valor almacenado junto con su TTL.
#[derive(Debug, Clone)]
struct StoredValue {
    payload: Arc<str>,
    ttl: Duration,
}

/// Politica de expiracion por entrada: cada write fija su propio TTL.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    // Un overwrite reinicia el TTL, igual que `SET key value EX ttl`.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Backend en memoria, thread-safe y async-friendly.
///
/// Usado en modo single-instance, cuando Redis no esta disponible al arrancar,
/// y en tests.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Cache<String, StoredValue>,
}

impl MemoryBackend {
    /// Default maximum number of entries.
    pub const DEFAULT_CAPACITY: u64 = 100_000;

    /// Crea un backend con la capacidad dada.
    pub fn new(max_capacity: u64) -> Self {
        Self::build(max_capacity, None)
    }

    /// Crea un backend que reporta evictions en `metrics`.
    pub fn with_metrics(max_capacity: u64, metrics: CacheMetrics) -> Self {
        Self::build(max_capacity, Some(metrics))
    }

    fn build(max_capacity: u64, metrics: Option<CacheMetrics>) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl);

        if let Some(eviction_metrics) = metrics {
            builder = builder.eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    moka::notification::RemovalCause::Expired => "ttl",
                    moka::notification::RemovalCause::Size => "capacity",
                    moka::notification::RemovalCause::Explicit => "manual",
                    moka::notification::RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            });
        }

        Self {
            inner: builder.build(),
        }
    }

    /// Numero aproximado de entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Fuerza la limpieza de entries expiradas (para tests principalmente).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).await.map(|v| v.payload.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let stored = StoredValue {
            payload: Arc::from(value),
            ttl,
        };
        self.inner.insert(key.to_string(), stored).await;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut removed = 0;
        for key in keys {
            if self.inner.remove(key).await.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let pattern = Pattern::new(pattern).map_err(|e| StoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        self.inner.run_pending_tasks().await;

        // Snapshot: entries pueden cambiar durante la iteracion
        Ok(self
            .inner
            .iter()
            .filter(|(key, _)| pattern.matches(key))
            .map(|(key, _)| key.to_string())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
