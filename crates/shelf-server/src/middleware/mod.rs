//! Middleware stack para el servidor HTTP.
//!
//! Se aplica a todas las requests, en este orden:
//! - `RequestIdLayer`: genera/propaga X-Request-Id y lo deja como extension
//! - `LoggingLayer`: un span por request con id, metodo, path y canal

mod logging;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
