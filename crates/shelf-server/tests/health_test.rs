mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use helpers::TestApp;
use serde_json::Value;
use shelf_server::cache::{CacheStore, RedisBackend, RedisConfig, StoreConfig};

#[tokio::test]
async fn health_check_returns_200() {
    let app = TestApp::new();

    app.client()
        .get("/health")
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn health_reports_cache_backend() {
    let app = TestApp::new();

    let json: Value = app.client().get("/health").await.json();

    assert_eq!(json["status"], "UP");
    assert_eq!(json["cache_backend"], "memory");
    assert_eq!(json["cache_available"], true);
}

#[tokio::test]
async fn health_includes_warmup_status() {
    let app = TestApp::seeded(2, 0);

    let before: Value = app.client().get("/health").await.json();
    assert_eq!(before["warmup"]["runs"], 0);

    app.client().post("/cache/warmup").await;

    let after: Value = app.client().get("/health").await.json();
    assert_eq!(after["warmup"]["runs"], 1);
    assert_eq!(after["warmup"]["last_entries"], 2);
    assert_eq!(after["warmup"]["consecutive_failures"], 0);
}

#[tokio::test]
async fn health_is_degraded_when_backend_unreachable() {
    let backend = RedisBackend::connect(&RedisConfig {
        url: "redis://127.0.0.1:1".to_string(),
        timeout_ms: 200,
        ..RedisConfig::default()
    })
    .unwrap();
    let store = CacheStore::new(
        Arc::new(backend),
        StoreConfig {
            op_timeout: Duration::from_millis(500),
            ..StoreConfig::default()
        },
    );
    let app = TestApp::with_store(1, 0, store);

    let response = app.client().get("/health").await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(json["status"], "DEGRADED");
    assert_eq!(json["cache_backend"], "redis");

    // Lookups keep working through the source
    app.client()
        .get("/products/1")
        .await
        .assert_status(StatusCode::OK);
}
