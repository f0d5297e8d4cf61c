//! Periodic cache warmup.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use shelf_core::{EntityKind, RequestContext};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval, interval_at};
use tracing::{debug, info, warn};

use super::WarmupState;
use crate::cache::{CacheRegistry, WarmupReport};
use crate::metrics::record_warmup_run;

/// Default page size of the bulk scan.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default interval between runs (60 minutes).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Error de warmup para un tipo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindFailure {
    pub kind: EntityKind,
    pub error: String,
}

/// Resultado de una pasada completa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarmupSummary {
    pub reports: Vec<WarmupReport>,
    pub failures: Vec<KindFailure>,
    pub duration_ms: u64,
}

impl WarmupSummary {
    /// Entradas escritas en total.
    pub fn entries(&self) -> u64 {
        self.reports.iter().map(|r| r.cached as u64).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Clears the running flag even if a warmup task panics.
struct RunGuard<'a>(&'a WarmupState);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// Bulk-loads every registered cache from its source.
#[derive(Clone)]
pub struct CacheWarmer {
    registry: CacheRegistry,
    state: Arc<WarmupState>,
    page_size: usize,
}

impl CacheWarmer {
    pub fn new(registry: CacheRegistry, state: Arc<WarmupState>, page_size: usize) -> Self {
        Self {
            registry,
            state,
            page_size: page_size.max(1),
        }
    }

    pub fn state(&self) -> &Arc<WarmupState> {
        &self.state
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Runs one pass over every kind.
    ///
    /// Returns `None` without doing anything if a pass is already running.
    /// A failing kind is recorded and does not stop the others.
    pub async fn run_once(&self) -> Option<WarmupSummary> {
        if !self.state.try_begin() {
            info!("Warmup already in progress, skipping");
            return None;
        }
        let _guard = RunGuard(&self.state);

        let start = Instant::now();
        let ctx = RequestContext::system();
        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for cache in self.registry.iter() {
            let kind = cache.kind();
            let kind_start = Instant::now();

            match cache.warm(&ctx, self.page_size).await {
                Ok(report) => {
                    record_warmup_run(kind.key_segment(), report.cached as u64, kind_start.elapsed());
                    reports.push(report);
                },
                Err(e) => {
                    warn!(kind = %kind, error = %e, "Cache warmup failed");
                    failures.push(KindFailure {
                        kind,
                        error: e.to_string(),
                    });
                },
            }
        }

        let duration = start.elapsed();
        let summary = WarmupSummary {
            reports,
            failures,
            duration_ms: duration.as_millis() as u64,
        };

        if summary.is_success() {
            self.state.record_success(summary.entries(), duration);
            info!(
                entries = summary.entries(),
                duration_ms = summary.duration_ms,
                "Cache warmup completed"
            );
        } else {
            let error = summary
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.kind, f.error))
                .collect::<Vec<_>>()
                .join("; ");
            self.state.record_failure(error, summary.entries(), duration);
        }

        Some(summary)
    }
}

/// Configuration for the warmup scheduler.
#[derive(Debug, Clone)]
pub struct WarmupConfig {
    /// Interval between runs.
    pub interval: Duration,
    /// Run immediately on start instead of after the first interval.
    pub run_on_startup: bool,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            run_on_startup: true,
        }
    }
}

/// Handle for controlling a running warmup scheduler.
pub struct WarmupHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl WarmupHandle {
    /// Signals the scheduler to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for WarmupHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Background scheduler running [`CacheWarmer::run_once`] on an interval.
pub struct WarmupScheduler {
    warmer: CacheWarmer,
    config: WarmupConfig,
}

impl WarmupScheduler {
    pub fn new(warmer: CacheWarmer, config: WarmupConfig) -> Self {
        Self { warmer, config }
    }

    /// Starts the background task.
    ///
    /// Returns a handle that can be used to stop the scheduler.
    pub fn start(self) -> WarmupHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = WarmupHandle { shutdown_tx };

        tokio::spawn(self.run(shutdown_rx));

        handle
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let period = self.config.interval;
        let mut timer = if self.config.run_on_startup {
            interval(period)
        } else {
            interval_at(tokio::time::Instant::now() + period, period)
        };
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = period.as_secs(),
            page_size = self.warmer.page_size(),
            "Starting cache warmup scheduler"
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    debug!("Starting scheduled warmup");
                    self.warmer.run_once().await;
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Warmup scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }
}
