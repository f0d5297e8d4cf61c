//! Application state.

use std::sync::Arc;

use shelf_core::{Product, ProductVariant};

use crate::cache::{CacheRegistry, CacheStore, EntityCache};
use crate::warmup::{CacheWarmer, WarmupState};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    products: Arc<EntityCache<Product>>,
    variants: Arc<EntityCache<ProductVariant>>,
    registry: CacheRegistry,
    store: CacheStore,
    warmer: Option<CacheWarmer>,
}

impl AppState {
    /// Creates the state and registers both caches.
    pub fn new(
        store: CacheStore,
        products: Arc<EntityCache<Product>>,
        variants: Arc<EntityCache<ProductVariant>>,
    ) -> Self {
        let registry = CacheRegistry::new()
            .with(products.clone())
            .with(variants.clone());

        Self {
            products,
            variants,
            registry,
            store,
            warmer: None,
        }
    }

    /// Enables the manual warmup endpoint and warmup status on `/health`.
    pub fn with_warmer(mut self, warmer: CacheWarmer) -> Self {
        self.warmer = Some(warmer);
        self
    }

    pub fn products(&self) -> &EntityCache<Product> {
        &self.products
    }

    pub fn variants(&self) -> &EntityCache<ProductVariant> {
        &self.variants
    }

    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn warmer(&self) -> Option<&CacheWarmer> {
        self.warmer.as_ref()
    }

    pub fn warmup_state(&self) -> Option<&Arc<WarmupState>> {
        self.warmer.as_ref().map(|w| w.state())
    }
}
