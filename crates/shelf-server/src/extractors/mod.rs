//! Extractors de Axum.

mod context;
mod path;

pub use context::{CHANNEL_HEADER, CatalogContext};
pub use path::{IdPath, KindIdPath, KindPath};
