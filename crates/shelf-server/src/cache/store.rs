//! Fail-open cache store.
//!
//! [`CacheStore`] is the only component that talks to a [`CacheBackend`]. It
//! serializes values as JSON, bounds every call with a timeout and absorbs
//! every backend failure: reads degrade to a miss, writes and deletes to a
//! no-op. Callers never see a cache error.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::backend::{CacheBackend, MemoryBackend, RedisBackend, RedisConfig, StoreError};
use crate::metrics::CacheMetrics;

/// Configuracion del store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Timeout de cada operacion contra el backend.
    pub op_timeout: Duration,
    /// TTL usado por `set_default` (default: 300 = 5 minutos).
    pub default_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_secs(5),
            default_ttl: Duration::from_secs(300),
        }
    }
}

/// Adapter sobre el backend de cache.
///
/// Cheap to clone; every clone shares the same backend connection.
///
/// # Examples
///
/// ```no_run
/// use shelf_server::cache::CacheStore;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = CacheStore::in_memory();
/// store.set("vendure:product:1", &"snapshot", Duration::from_secs(60)).await;
///
/// let value: Option<String> = store.get("vendure:product:1").await;
/// assert_eq!(value.as_deref(), Some("snapshot"));
/// # }
/// ```
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    config: StoreConfig,
    metrics: CacheMetrics,
}

impl CacheStore {
    /// Crea un store sobre el backend dado.
    pub fn new(backend: Arc<dyn CacheBackend>, config: StoreConfig) -> Self {
        Self::with_metrics(backend, config, CacheMetrics::new())
    }

    /// Crea un store que registra en `metrics`.
    pub fn with_metrics(
        backend: Arc<dyn CacheBackend>,
        config: StoreConfig,
        metrics: CacheMetrics,
    ) -> Self {
        Self {
            backend,
            config,
            metrics,
        }
    }

    /// Store en memoria con configuracion por defecto.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()), StoreConfig::default())
    }

    /// Lee y deserializa un valor.
    ///
    /// Backend failure, timeout and undecodable payloads are all reported as
    /// `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.guarded("get", self.backend.get(key)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache GET failed, treating as miss");
                self.metrics.record_miss();
                return None;
            },
        };

        let Some(raw) = raw else {
            debug!(key = %key, "cache miss");
            self.metrics.record_miss();
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %key, "cache hit");
                self.metrics.record_hit();
                Some(value)
            },
            Err(e) => {
                warn!(key = %key, error = %e, "Undecodable cache entry, treating as miss");
                self.metrics.record_error("decode");
                self.metrics.record_miss();
                None
            },
        }
    }

    /// Serializa y escribe un valor con TTL, reemplazando el anterior.
    ///
    /// Returns `true` if the backend acknowledged the write.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache value");
                self.metrics.record_error("encode");
                return false;
            },
        };

        match self.guarded("set", self.backend.set(key, payload, ttl)).await {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set");
                true
            },
            Err(e) => {
                warn!(key = %key, error = %e, "Cache SET failed");
                false
            },
        }
    }

    /// Escribe un valor con el TTL por defecto del store.
    pub async fn set_default<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.set(key, value, self.config.default_ttl).await
    }

    /// Elimina una key. Idempotente; una key ausente no es un error.
    pub async fn delete(&self, key: &str) {
        let keys = [key.to_string()];
        match self.guarded("delete", self.backend.delete(&keys)).await {
            Ok(removed) => debug!(key = %key, removed = removed, "cache delete"),
            Err(e) => warn!(key = %key, error = %e, "Cache DEL failed"),
        }
    }

    /// Elimina todas las keys que coincidan con un patron glob.
    ///
    /// Administrative flush: enumerates matching keys, then deletes them in
    /// one call. Returns the number of deleted entries, 0 on failure.
    pub async fn delete_by_pattern(&self, pattern: &str) -> usize {
        let keys = match self.guarded("keys", self.backend.keys(pattern)).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Cache KEYS failed");
                return 0;
            },
        };

        if keys.is_empty() {
            debug!(pattern = %pattern, "No cache entries match pattern");
            return 0;
        }

        match self.guarded("delete", self.backend.delete(&keys)).await {
            Ok(removed) => {
                info!(pattern = %pattern, count = removed, "Cache entries deleted by pattern");
                removed as usize
            },
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Cache DEL by pattern failed");
                0
            },
        }
    }

    /// Retorna true si el backend responde.
    pub async fn is_available(&self) -> bool {
        self.guarded("ping", self.backend.ping()).await.is_ok()
    }

    /// Nombre del backend (`redis`, `memory`).
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Libera la conexion del backend. Llamar una vez, al apagar el proceso.
    pub fn close(&self) {
        info!(backend = self.backend.name(), "Closing cache store");
        self.backend.close();
    }

    /// Runs a backend call under the operation timeout, recording its latency
    /// and any failure.
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.config.op_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation,
                millis: self.config.op_timeout.as_millis() as u64,
            }),
        };

        self.metrics
            .record_operation_duration(operation, start.elapsed());
        if result.is_err() {
            self.metrics.record_error(operation);
        }

        result
    }
}

/// Construye el store del proceso.
///
/// Redis disabled, unparseable or unreachable at startup all fall back to the
/// memory backend so the process can start without Redis.
pub async fn connect_store(
    redis: &RedisConfig,
    local_capacity: u64,
    default_ttl: Duration,
) -> CacheStore {
    let metrics = CacheMetrics::new();
    let config = StoreConfig {
        op_timeout: redis.timeout(),
        default_ttl,
    };
    let local = || -> Arc<dyn CacheBackend> {
        Arc::new(MemoryBackend::with_metrics(local_capacity, metrics.clone()))
    };

    if !redis.enabled {
        info!("Redis disabled, using in-memory cache");
        return CacheStore::with_metrics(local(), config, metrics);
    }

    info!(url = %redis.url, "Connecting to Redis");

    let backend = match RedisBackend::connect(redis) {
        Ok(backend) => backend,
        Err(e) => {
            warn!(error = %e, "Failed to create Redis pool, falling back to in-memory cache");
            return CacheStore::with_metrics(local(), config, metrics);
        },
    };

    match ping_within(&backend, redis.timeout()).await {
        Ok(()) => {
            info!("Connected to Redis");
            CacheStore::with_metrics(Arc::new(backend), config, metrics)
        },
        Err(e) => {
            warn!(error = %e, "Redis unreachable, falling back to in-memory cache");
            backend.close();
            CacheStore::with_metrics(local(), config, metrics)
        },
    }
}

/// Startup reachability check, bounded by `limit`.
async fn ping_within(backend: &dyn CacheBackend, limit: Duration) -> Result<(), StoreError> {
    tokio::time::timeout(limit, backend.ping())
        .await
        .unwrap_or(Err(StoreError::Timeout {
            operation: "ping",
            millis: limit.as_millis() as u64,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        id: u64,
        name: String,
    }

    /// Backend that fails every call, like a Redis that refuses connections.
    struct DownBackend;

    #[async_trait]
    impl CacheBackend for DownBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Pool("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), StoreError> {
            Err(StoreError::Pool("connection refused".into()))
        }
        async fn delete(&self, _keys: &[String]) -> Result<u64, StoreError> {
            Err(StoreError::Pool("connection refused".into()))
        }
        async fn keys(&self, _pattern: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Pool("connection refused".into()))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Pool("connection refused".into()))
        }
        fn name(&self) -> &'static str {
            "down"
        }
    }

    /// Backend that never answers.
    struct HangingBackend;

    #[async_trait]
    impl CacheBackend for HangingBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            std::future::pending().await
        }
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn delete(&self, _keys: &[String]) -> Result<u64, StoreError> {
            std::future::pending().await
        }
        async fn keys(&self, _pattern: &str) -> Result<Vec<String>, StoreError> {
            std::future::pending().await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            std::future::pending().await
        }
        fn name(&self) -> &'static str {
            "hanging"
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            id: 42,
            name: "Cafe".to_string(),
        }
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = CacheStore::in_memory();
        assert!(store.set("k", &snapshot(), Duration::from_secs(60)).await);

        let cached: Option<Snapshot> = store.get("k").await;
        assert_eq!(cached, Some(snapshot()));
        assert_eq!(store.metrics().hits(), 1);
    }

    #[tokio::test]
    async fn test_miss_is_counted() {
        let store = CacheStore::in_memory();
        let cached: Option<Snapshot> = store.get("absent").await;

        assert!(cached.is_none());
        assert_eq!(store.metrics().misses(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let backend = Arc::new(MemoryBackend::default());
        backend
            .set("k", "{not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let store = CacheStore::new(backend, StoreConfig::default());

        let cached: Option<Snapshot> = store.get("k").await;
        assert!(cached.is_none());
        assert_eq!(store.metrics().errors(), 1);
    }

    #[tokio::test]
    async fn test_backend_down_fails_open() {
        let store = CacheStore::new(Arc::new(DownBackend), StoreConfig::default());

        assert!(!store.set("k", &snapshot(), Duration::from_secs(60)).await);
        let cached: Option<Snapshot> = store.get("k").await;
        assert!(cached.is_none());
        store.delete("k").await;
        assert_eq!(store.delete_by_pattern("*").await, 0);
        assert!(!store.is_available().await);
        assert!(store.metrics().errors() >= 4);
    }

    #[tokio::test]
    async fn test_timeout_fails_open() {
        let store = CacheStore::new(
            Arc::new(HangingBackend),
            StoreConfig {
                op_timeout: Duration::from_millis(20),
                ..StoreConfig::default()
            },
        );

        let cached: Option<Snapshot> = store.get("k").await;
        assert!(cached.is_none());
        assert!(!store.set("k", &snapshot(), Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_delete_absent_key() {
        let store = CacheStore::in_memory();
        store.delete("never-written").await;

        let cached: Option<Snapshot> = store.get("never-written").await;
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_pattern() {
        let store = CacheStore::in_memory();
        for id in 1..=3 {
            store
                .set(&format!("ns:product:{}", id), &id, Duration::from_secs(60))
                .await;
        }
        store.set("ns:variant:1", &1, Duration::from_secs(60)).await;

        assert_eq!(store.delete_by_pattern("ns:product:*").await, 3);
        assert!(store.get::<u64>("ns:product:1").await.is_none());
        assert_eq!(store.get::<u64>("ns:variant:1").await, Some(1));
    }

    #[tokio::test]
    async fn test_set_default_ttl() {
        let store = CacheStore::new(
            Arc::new(MemoryBackend::default()),
            StoreConfig {
                default_ttl: Duration::from_millis(100),
                ..StoreConfig::default()
            },
        );
        store.set_default("k", &1u8).await;
        assert_eq!(store.get::<u8>("k").await, Some(1));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(store.get::<u8>("k").await.is_none());
    }

    #[tokio::test]
    async fn test_connect_store_without_redis() {
        let store = connect_store(
            &RedisConfig {
                enabled: false,
                ..RedisConfig::default()
            },
            1000,
            Duration::from_secs(300),
        )
        .await;

        assert_eq!(store.backend_name(), "memory");
        assert!(store.is_available().await);
    }

    #[tokio::test]
    async fn test_startup_ping_is_bounded() {
        let start = Instant::now();
        let result = ping_within(&HangingBackend, Duration::from_millis(50)).await;

        assert!(matches!(
            result,
            Err(StoreError::Timeout {
                operation: "ping",
                millis: 50
            })
        ));
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(ping_within(&DownBackend, Duration::from_millis(50)).await.is_err());
    }

    #[tokio::test]
    async fn test_connect_store_falls_back_when_unreachable() {
        let store = connect_store(
            &RedisConfig {
                url: "redis://127.0.0.1:1".to_string(),
                timeout_ms: 100,
                ..RedisConfig::default()
            },
            1000,
            Duration::from_secs(300),
        )
        .await;

        assert_eq!(store.backend_name(), "memory");
    }
}
