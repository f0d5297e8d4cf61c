//! Registry of entity caches by kind.

use std::collections::HashMap;
use std::sync::Arc;

use shelf_core::EntityKind;

use super::entity_cache::ManagedCache;

/// Caches registrados, uno por [`EntityKind`].
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: HashMap<EntityKind, Arc<dyn ManagedCache>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un cache. Reemplaza el anterior del mismo tipo.
    pub fn register(&mut self, cache: Arc<dyn ManagedCache>) -> &mut Self {
        self.caches.insert(cache.kind(), cache);
        self
    }

    /// Builder variant of [`register`](Self::register).
    pub fn with(mut self, cache: Arc<dyn ManagedCache>) -> Self {
        self.register(cache);
        self
    }

    pub fn get(&self, kind: EntityKind) -> Option<&Arc<dyn ManagedCache>> {
        self.caches.get(&kind)
    }

    /// Itera los caches en el orden de [`EntityKind::ALL`].
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ManagedCache>> {
        EntityKind::ALL
            .iter()
            .filter_map(|kind| self.caches.get(kind))
    }

    pub fn kinds(&self) -> Vec<EntityKind> {
        self.iter().map(|cache| cache.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, EntityCache};
    use shelf_core::{Product, ProductVariant};
    use shelf_source::MemoryTable;

    fn registry() -> CacheRegistry {
        let store = CacheStore::in_memory();
        let products: Arc<MemoryTable<Product>> = Arc::new(MemoryTable::new("products"));
        let variants: Arc<MemoryTable<ProductVariant>> = Arc::new(MemoryTable::new("variants"));

        // Registered out of order on purpose
        CacheRegistry::new()
            .with(Arc::new(EntityCache::<ProductVariant>::new(store.clone(), variants, "vendure")))
            .with(Arc::new(EntityCache::<Product>::new(store, products, "vendure")))
    }

    #[test]
    fn test_iter_follows_kind_order() {
        assert_eq!(
            registry().kinds(),
            vec![EntityKind::Product, EntityKind::ProductVariant]
        );
    }

    #[test]
    fn test_get_by_kind() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get(EntityKind::ProductVariant).map(|c| c.kind()),
            Some(EntityKind::ProductVariant)
        );
        assert!(CacheRegistry::new().get(EntityKind::Product).is_none());
        assert!(CacheRegistry::new().is_empty());
    }
}
