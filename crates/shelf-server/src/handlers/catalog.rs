//! Cached catalog lookups.

use axum::{
    Json,
    extract::{Path, State},
};
use shelf_core::{EntityKind, Product, ProductVariant};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::{CatalogContext, IdPath};
use crate::state::AppState;

/// GET /products/{id}
#[instrument(skip_all, fields(id = %path.id, channel = %ctx.channel))]
pub async fn get_product(
    State(state): State<AppState>,
    CatalogContext(ctx): CatalogContext,
    Path(path): Path<IdPath>,
) -> Result<Json<Product>, AppError> {
    let id = path.entity_id()?;

    state
        .products()
        .lookup(&ctx, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound {
            kind: EntityKind::Product,
            id,
        })
}

/// GET /variants/{id}
#[instrument(skip_all, fields(id = %path.id, channel = %ctx.channel))]
pub async fn get_variant(
    State(state): State<AppState>,
    CatalogContext(ctx): CatalogContext,
    Path(path): Path<IdPath>,
) -> Result<Json<ProductVariant>, AppError> {
    let id = path.entity_id()?;

    state
        .variants()
        .lookup(&ctx, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound {
            kind: EntityKind::ProductVariant,
            id,
        })
}
