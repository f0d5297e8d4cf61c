//! # Shelf Source
//!
//! Source-of-record abstraction for the Shelf catalog cache.
//!
//! The cache layer never talks to the catalog database directly. It depends on
//! the [`SourceOfRecord`] trait for point and paginated reads, and on the
//! [`EventBus`] for entity lifecycle notifications.
//!
//! ## Features
//!
//! - Async trait-based source abstraction, generic over the cached entity
//! - Stable-ordered pagination for bulk warmup scans
//! - In-process publish/subscribe bus for lifecycle events
//! - In-memory catalog that emits events on every mutation and can be seeded
//!   from a JSON export
//!
//! ## Example
//!
//! ```ignore
//! use shelf_source::{EventBus, MemorySource, SourceOfRecord};
//!
//! let bus = EventBus::new(1024);
//! let catalog = MemorySource::new(bus.clone());
//! catalog.upsert_products(&ctx, vec![product]).await;
//!
//! let found = catalog.products().find_one(&ctx, id).await?;
//! ```

pub mod error;
pub mod events;
pub mod memory;
pub mod source;

// Re-exports
pub use error::SourceError;
pub use events::{EventBus, EventSubscription, SubscriptionError};
pub use memory::{CatalogSeed, MemorySource, MemoryTable};
pub use source::{Page, PageRequest, SourceOfRecord};

// Re-export shelf_core for consumers
pub use shelf_core;
