//! Source-of-record trait definition.

use async_trait::async_trait;
use shelf_core::{Entity, EntityId, RequestContext};

use super::{Page, PageRequest};
use crate::error::SourceError;

/// The authoritative store for one kind of catalog entity.
///
/// This trait abstracts over the catalog database so the cache layer can read
/// entities without knowing how they are persisted.
///
/// # Implementors
///
/// - `MemoryTable` - An in-process table, used for seeded catalogs and tests
///
/// # Example
///
/// ```ignore
/// use shelf_source::{Page, PageRequest, SourceOfRecord, SourceError};
///
/// struct ProductTable;
///
/// #[async_trait]
/// impl SourceOfRecord<Product> for ProductTable {
///     async fn find_one(&self, ctx: &RequestContext, id: EntityId)
///         -> Result<Option<Product>, SourceError> {
///         // Implementation here
///     }
///
///     async fn find_all(&self, ctx: &RequestContext, page: PageRequest)
///         -> Result<Page<Product>, SourceError> {
///         // Implementation here
///     }
///
///     fn name(&self) -> &str {
///         "products"
///     }
/// }
/// ```
#[async_trait]
pub trait SourceOfRecord<E: Entity>: Send + Sync {
    /// Fetches a single entity.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no entity has the given id. Absence is a normal outcome.
    ///
    /// # Errors
    ///
    /// - `SourceError::Unavailable` if the backing store cannot be reached
    /// - `SourceError::Query` if the read itself fails
    async fn find_one(&self, ctx: &RequestContext, id: EntityId) -> Result<Option<E>, SourceError>;

    /// Fetches one page of entities.
    ///
    /// Implementations must use a stable ordering so that consecutive pages
    /// partition the whole set.
    async fn find_all(&self, ctx: &RequestContext, page: PageRequest)
    -> Result<Page<E>, SourceError>;

    /// Returns the name of this source.
    ///
    /// This is used for logging and identification purposes.
    fn name(&self) -> &str;
}
