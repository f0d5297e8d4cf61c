//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!("shelf_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("shelf_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "shelf_cache_errors_total",
        "Cache backend failures that were absorbed as misses or no-ops"
    );
    metrics::describe_counter!(
        "shelf_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_histogram!(
        "shelf_cache_operation_seconds",
        "Time spent on cache operations"
    );
    metrics::describe_counter!(
        "shelf_warmup_entries_total",
        "Entities written to the cache by warmup"
    );
    metrics::describe_gauge!(
        "shelf_warmup_last_duration_seconds",
        "Duration of the last warmup run"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para consultar hit rate sin el exporter.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("shelf_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("shelf_cache_misses_total").increment(1);
    }

    /// Registra un fallo del backend absorbido por el store
    pub fn record_error(&self, operation: &'static str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!("shelf_cache_errors_total", "operation" => operation).increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, reason: &'static str) {
        counter!("shelf_cache_evictions_total", "reason" => reason).increment(1);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("shelf_cache_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let misses = self.misses() as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Registra el resultado de una pasada de warmup.
pub fn record_warmup_run(kind: &'static str, entries: u64, duration: Duration) {
    counter!("shelf_warmup_entries_total", "kind" => kind).increment(entries);
    gauge!("shelf_warmup_last_duration_seconds").set(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics_hit_rate() {
        let metrics = CacheMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        assert!((metrics.hit_rate() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_hit_rate_without_traffic() {
        assert_eq!(CacheMetrics::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::new();
        let clone = metrics.clone();

        clone.record_miss();
        clone.record_error("get");

        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.errors(), 1);
        assert_eq!(metrics.hits(), 0);
    }
}
