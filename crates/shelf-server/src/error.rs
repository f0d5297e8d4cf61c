use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shelf_core::{EntityId, EntityKind};
use shelf_source::SourceError;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    /// Entidad no encontrada en cache ni en el source
    NotFound { kind: EntityKind, id: EntityId },

    /// Parametros invalidos
    BadRequest(String),

    /// Operacion en conflicto con otra en curso
    Conflict(String),

    /// Fallo del source of record
    Source(SourceError),

    /// Error interno
    Internal(String),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Source(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound { kind, id } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("{} with id {} not found", kind.display_name(), id),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", msg),
            AppError::Source(err) => {
                error!(error = %err, transient = err.is_transient(), "Source of record failure");
                if err.is_transient() {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Service Unavailable",
                        err.to_string(),
                    )
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                        err.to_string(),
                    )
                }
            },
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
