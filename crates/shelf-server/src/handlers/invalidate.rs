//! Cache invalidation endpoint handlers.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use shelf_core::EntityKind;
use tracing::{info, instrument};

use crate::cache::ManagedCache;
use crate::error::AppError;
use crate::extractors::{KindIdPath, KindPath};
use crate::state::AppState;

/// Response para operaciones de invalidación.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Número de entries invalidadas.
    pub invalidated: usize,
    /// Mensaje descriptivo.
    pub message: String,
}

fn cache_for(state: &AppState, kind: EntityKind) -> Result<&dyn ManagedCache, AppError> {
    state
        .registry()
        .get(kind)
        .map(|cache| cache.as_ref())
        .ok_or_else(|| AppError::Internal(format!("No cache registered for {}", kind)))
}

/// DELETE /cache
/// Vacía el cache de todos los tipos.
#[instrument(skip_all)]
pub async fn invalidate_all(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let mut count = 0;
    for cache in state.registry().iter() {
        count += cache.flush().await;
    }

    info!(count = count, "All cache entries invalidated");

    Json(InvalidateResponse {
        invalidated: count,
        message: format!("Invalidated all {} cache entries", count),
    })
}

/// DELETE /cache/{kind}
/// Vacía el cache de un tipo.
#[instrument(skip_all, fields(kind = %path.kind))]
pub async fn invalidate_kind(
    State(state): State<AppState>,
    Path(path): Path<KindPath>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let kind = path.entity_kind()?;
    let count = cache_for(&state, kind)?.flush().await;

    info!(kind = %kind, count = count, "Cache entries invalidated");

    Ok(Json(InvalidateResponse {
        invalidated: count,
        message: format!("Invalidated {} {} cache entries", count, kind),
    }))
}

/// DELETE /cache/{kind}/{id}
/// Invalida una entry. Idempotente: una entry ausente no es un error.
#[instrument(skip_all, fields(kind = %path.kind, id = %path.id))]
pub async fn invalidate_entry(
    State(state): State<AppState>,
    Path(path): Path<KindIdPath>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let (kind, id) = path.parse()?;
    cache_for(&state, kind)?.invalidate(id).await;

    info!(kind = %kind, id = %id, "Cache entry invalidated");

    Ok(Json(InvalidateResponse {
        invalidated: 1,
        message: format!("Invalidated cache entry for {} {}", kind, id),
    }))
}
