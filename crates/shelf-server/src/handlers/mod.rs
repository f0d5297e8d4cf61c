pub mod catalog;
pub mod health;
pub mod invalidate;
pub mod metrics;
pub mod warmup;
