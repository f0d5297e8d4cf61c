//! Test helpers para shelf-server.

#![allow(dead_code, unused_imports)]

pub mod app;
pub mod client;

pub use app::{NAMESPACE, TestApp, product, variant, wait_for_events};
pub use client::{TestClient, TestResponse};
