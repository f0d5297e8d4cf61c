//! Read-through cache layer.
//!
//! - [`CacheStore`]: fail-open adapter over a Redis or in-memory backend
//! - [`EntityCache`]: read-through lookup, invalidate and populate per kind
//! - [`InvalidationListener`]: applies lifecycle events to the caches
//!
//! Keys follow `<namespace>:<kind>:<id>`, e.g. `vendure:product:42`.

pub mod backend;
mod entity_cache;
mod invalidation;
mod keys;
mod registry;
mod store;

pub use backend::{CacheBackend, MemoryBackend, RedisBackend, RedisConfig, StoreError};
pub use entity_cache::{
    DEFAULT_ENTITY_TTL, EntityCache, ManagedCache, NegativeCaching, WarmupReport,
};
pub use invalidation::{EventOutcome, InvalidationListener, ListenerHandle};
pub use keys::{CacheKey, KeySpace};
pub use registry::CacheRegistry;
pub use store::{CacheStore, StoreConfig, connect_store};
