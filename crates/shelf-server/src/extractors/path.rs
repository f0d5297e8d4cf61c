use serde::Deserialize;
use shelf_core::{EntityId, EntityKind};

use crate::error::AppError;

/// Extractor para rutas /products/{id} y /variants/{id}
#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: String,
}

/// Extractor para rutas /cache/{kind}
#[derive(Debug, Deserialize)]
pub struct KindPath {
    pub kind: String,
}

/// Extractor para rutas /cache/{kind}/{id}
#[derive(Debug, Deserialize)]
pub struct KindIdPath {
    pub kind: String,
    pub id: String,
}

fn parse_id(raw: &str) -> Result<EntityId, AppError> {
    raw.parse()
        .map_err(|e: shelf_core::CoreError| AppError::BadRequest(e.to_string()))
}

fn parse_kind(raw: &str) -> Result<EntityKind, AppError> {
    raw.parse()
        .map_err(|e: shelf_core::CoreError| AppError::BadRequest(e.to_string()))
}

impl IdPath {
    pub fn entity_id(&self) -> Result<EntityId, AppError> {
        parse_id(&self.id)
    }
}

impl KindPath {
    pub fn entity_kind(&self) -> Result<EntityKind, AppError> {
        parse_kind(&self.kind)
    }
}

impl KindIdPath {
    /// Valida y parsea ambos segmentos.
    pub fn parse(&self) -> Result<(EntityKind, EntityId), AppError> {
        Ok((parse_kind(&self.kind)?, parse_id(&self.id)?))
    }
}
