use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;
use crate::warmup::WarmupStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `UP`, o `DEGRADED` si el backend de cache no responde.
    pub status: String,
    pub cache_backend: String,
    pub cache_available: bool,
    pub hit_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmup: Option<WarmupStatus>,
}

/// GET /health
///
/// Un backend caido no tumba el servicio: los lookups siguen yendo al source.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store();
    let available = store.is_available().await;

    Json(HealthResponse {
        status: if available { "UP" } else { "DEGRADED" }.to_string(),
        cache_backend: store.backend_name().to_string(),
        cache_available: available,
        hit_rate: store.metrics().hit_rate(),
        warmup: state.warmup_state().map(|s| s.status()),
    })
}
