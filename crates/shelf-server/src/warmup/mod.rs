//! Cache warmup.
//!
//! Bulk-loads every cached kind on startup and then on a fixed interval.
//! Warmup never subscribes to lifecycle events; freshness between runs is the
//! invalidation listener's job.

mod scheduler;
mod state;

pub use scheduler::{
    CacheWarmer, DEFAULT_INTERVAL, DEFAULT_PAGE_SIZE, KindFailure, WarmupConfig, WarmupHandle,
    WarmupScheduler, WarmupSummary,
};
pub use state::{WarmupState, WarmupStatus};
