use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tracing::{info, warn};

use crate::handlers::{
    catalog::{get_product, get_variant},
    health::health_check,
    invalidate::{invalidate_all, invalidate_entry, invalidate_kind},
    metrics::metrics_handler,
    warmup::trigger_warmup,
};
use crate::middleware::{LoggingLayer, RequestIdLayer};
use crate::state::AppState;

/// Rutas de la aplicacion, sin `/metrics`.
fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Cached lookups
        .route("/products/{id}", get(get_product))
        .route("/variants/{id}", get(get_variant))
        // Cache administration
        .route("/cache", delete(invalidate_all))
        .route("/cache/warmup", post(trigger_warmup))
        .route("/cache/{kind}", delete(invalidate_kind))
        .route("/cache/{kind}/{id}", delete(invalidate_entry))
        .with_state(state)
}

fn with_middleware(router: Router) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    router
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(middleware_stack)
}

/// Creates the full router with the metrics endpoint.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    with_middleware(Router::new().merge(app_routes(state)).merge(metrics_router))
}

/// Creates the router without `/metrics`, for tests where no global
/// recorder is installed.
pub fn create_app_router(state: AppState) -> Router {
    with_middleware(app_routes(state))
}

/// Binds `addr` and serves `router` until Ctrl+C or SIGTERM.
pub async fn run_server(addr: SocketAddr, router: Router) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
