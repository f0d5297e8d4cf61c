//! Manual warmup trigger.

use axum::{Json, extract::State};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::state::AppState;
use crate::warmup::WarmupSummary;

/// POST /cache/warmup
/// Ejecuta una pasada de warmup y espera a que termine.
#[instrument(skip_all)]
pub async fn trigger_warmup(State(state): State<AppState>) -> Result<Json<WarmupSummary>, AppError> {
    let warmer = state
        .warmer()
        .ok_or_else(|| AppError::BadRequest("Cache warmup is not enabled".to_string()))?;

    info!("Manual warmup triggered");

    warmer
        .run_once()
        .await
        .map(Json)
        .ok_or_else(|| AppError::Conflict("A warmup run is already in progress".to_string()))
}
