//! Warmup state tracking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

/// Estado de las pasadas de warmup, compartido con `/health`.
#[derive(Debug)]
pub struct WarmupState {
    /// Fin de la ultima pasada completa.
    last_run: RwLock<Option<Instant>>,
    /// Duracion de la ultima pasada.
    last_duration: RwLock<Option<Duration>>,
    /// Ultimo error, si la ultima pasada fallo para algun tipo.
    last_error: RwLock<Option<String>>,
    /// Pasadas consecutivas con errores.
    failure_count: RwLock<u32>,
    /// Entradas escritas por la ultima pasada.
    last_entries: AtomicU64,
    /// Pasadas terminadas.
    runs: AtomicU64,
    running: AtomicBool,
}

/// Snapshot serializable del estado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarmupStatus {
    pub running: bool,
    pub runs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_since_last_run: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_duration_ms: Option<u64>,
    pub last_entries: u64,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl WarmupState {
    pub fn new() -> Self {
        Self {
            last_run: RwLock::new(None),
            last_duration: RwLock::new(None),
            last_error: RwLock::new(None),
            failure_count: RwLock::new(0),
            last_entries: AtomicU64::new(0),
            runs: AtomicU64::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Marks a run as started. Returns false if one is already running.
    pub fn try_begin(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Marks the current run as finished.
    pub fn end(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Registra una pasada sin errores.
    pub fn record_success(&self, entries: u64, duration: Duration) {
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *last_error = None;
        *failure_count = 0;
        self.record_run(entries, duration);
    }

    /// Registra una pasada con errores. Las entradas que si se escribieron cuentan.
    pub fn record_failure(&self, error: impl Into<String>, entries: u64, duration: Duration) {
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *last_error = Some(error.into());
        *failure_count += 1;
        self.record_run(entries, duration);
    }

    fn record_run(&self, entries: u64, duration: Duration) {
        *self.last_run.write() = Some(Instant::now());
        *self.last_duration.write() = Some(duration);
        self.last_entries.store(entries, Ordering::Relaxed);
        self.runs.fetch_add(1, Ordering::AcqRel);
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Acquire)
    }

    pub fn last_run(&self) -> Option<Instant> {
        *self.last_run.read()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    pub fn failure_count(&self) -> u32 {
        *self.failure_count.read()
    }

    pub fn last_entries(&self) -> u64 {
        self.last_entries.load(Ordering::Relaxed)
    }

    /// Retorna true si la ultima pasada no tuvo errores (o aun no hubo pasadas).
    pub fn is_healthy(&self) -> bool {
        self.last_error.read().is_none()
    }

    pub fn status(&self) -> WarmupStatus {
        WarmupStatus {
            running: self.is_running(),
            runs: self.runs(),
            seconds_since_last_run: self.last_run().map(|t| t.elapsed().as_secs()),
            last_duration_ms: self.last_duration.read().map(|d| d.as_millis() as u64),
            last_entries: self.last_entries(),
            consecutive_failures: self.failure_count(),
            last_error: self.last_error(),
        }
    }
}

impl Default for WarmupState {
    fn default() -> Self {
        Self::new()
    }
}
