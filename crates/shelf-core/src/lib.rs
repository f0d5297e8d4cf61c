//! Shelf Core - Domain types for the catalog cache
//!
//! This crate provides the foundational types shared by the source-of-record
//! abstraction and the cache server: entity kinds and identifiers, the
//! request context, the cached catalog entities and their lifecycle events.

pub mod entity;
pub mod error;
pub mod event;
pub mod types;

pub use entity::{Entity, Product, ProductVariant};
pub use error::{CoreError, Result};
pub use event::{EventType, LifecycleEvent};
pub use types::{ApiType, EntityId, EntityKind, RequestContext};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
