//! In-memory catalog.
//!
//! Holds products and variants in ordered tables and publishes a
//! [`LifecycleEvent`] on the [`EventBus`] for every mutation, the same way the
//! catalog database notifies its listeners.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shelf_core::{
    Entity, EntityId, EventType, LifecycleEvent, Product, ProductVariant, RequestContext,
};
use tracing::{debug, info};

use crate::error::SourceError;
use crate::events::EventBus;
use crate::source::{Page, PageRequest, SourceOfRecord};

/// Catalog export used to seed a [`MemorySource`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl CatalogSeed {
    /// Reads a seed from a JSON file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| SourceError::parse(path, e.to_string()))
    }
}

/// Ordered in-memory table of one entity kind.
///
/// Entities are ordered by id, which gives `find_all` a stable ordering.
pub struct MemoryTable<E> {
    name: String,
    rows: RwLock<BTreeMap<EntityId, E>>,
    outage: RwLock<Option<String>>,
    find_one_calls: AtomicU64,
    find_all_calls: AtomicU64,
}

impl<E: Entity> MemoryTable<E> {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(BTreeMap::new()),
            outage: RwLock::new(None),
            find_one_calls: AtomicU64::new(0),
            find_all_calls: AtomicU64::new(0),
        }
    }

    /// Inserts or replaces entities. Returns `(created, updated)` ids.
    pub fn upsert(&self, items: impl IntoIterator<Item = E>) -> (Vec<EntityId>, Vec<EntityId>) {
        let mut rows = self.rows.write();
        let mut created = Vec::new();
        let mut updated = Vec::new();

        for item in items {
            let id = item.id();
            match rows.insert(id, item) {
                Some(_) => updated.push(id),
                None => created.push(id),
            }
        }

        (created, updated)
    }

    /// Removes entities. Returns the ids that existed.
    pub fn remove(&self, ids: &[EntityId]) -> Vec<EntityId> {
        let mut rows = self.rows.write();
        ids.iter()
            .copied()
            .filter(|id| rows.remove(id).is_some())
            .collect()
    }

    /// Replaces the whole content without reporting changes.
    pub fn replace_all(&self, items: impl IntoIterator<Item = E>) {
        let mut rows = self.rows.write();
        *rows = items.into_iter().map(|item| (item.id(), item)).collect();
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Makes every read fail with [`SourceError::Unavailable`] until
    /// [`MemoryTable::restore`] is called.
    pub fn simulate_outage(&self, reason: impl Into<String>) {
        *self.outage.write() = Some(reason.into());
    }

    /// Ends a simulated outage.
    pub fn restore(&self) {
        *self.outage.write() = None;
    }

    /// Number of `find_one` calls served so far.
    pub fn find_one_calls(&self) -> u64 {
        self.find_one_calls.load(Ordering::Relaxed)
    }

    /// Number of `find_all` calls served so far.
    pub fn find_all_calls(&self) -> u64 {
        self.find_all_calls.load(Ordering::Relaxed)
    }

    fn check_available(&self) -> Result<(), SourceError> {
        match self.outage.read().as_ref() {
            Some(reason) => Err(SourceError::unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<E: Entity> SourceOfRecord<E> for MemoryTable<E> {
    async fn find_one(&self, _ctx: &RequestContext, id: EntityId) -> Result<Option<E>, SourceError> {
        self.find_one_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;

        Ok(self.rows.read().get(&id).cloned())
    }

    async fn find_all(
        &self,
        _ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<Page<E>, SourceError> {
        self.find_all_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;

        let rows = self.rows.read();
        let items = rows
            .values()
            .skip(page.skip)
            .take(page.take)
            .cloned()
            .collect();

        Ok(Page::new(items, rows.len()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory catalog of products and variants.
#[derive(Clone)]
pub struct MemorySource {
    products: Arc<MemoryTable<Product>>,
    variants: Arc<MemoryTable<ProductVariant>>,
    bus: EventBus,
}

impl MemorySource {
    /// Creates an empty catalog publishing to `bus`.
    pub fn new(bus: EventBus) -> Self {
        Self {
            products: Arc::new(MemoryTable::new("memory:products")),
            variants: Arc::new(MemoryTable::new("memory:variants")),
            bus,
        }
    }

    /// Creates a catalog pre-loaded with `seed`. Seeding emits no events.
    pub fn with_seed(bus: EventBus, seed: CatalogSeed) -> Self {
        let source = Self::new(bus);
        source.products.replace_all(seed.products);
        source.variants.replace_all(seed.variants);

        info!(
            products = source.products.len(),
            variants = source.variants.len(),
            "Catalog seeded"
        );

        source
    }

    /// Product table.
    pub fn products(&self) -> Arc<MemoryTable<Product>> {
        Arc::clone(&self.products)
    }

    /// Variant table.
    pub fn variants(&self) -> Arc<MemoryTable<ProductVariant>> {
        Arc::clone(&self.variants)
    }

    /// The bus mutations are published on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Creates or updates products.
    pub fn upsert_products(&self, ctx: &RequestContext, items: Vec<Product>) {
        self.upsert(&self.products, ctx, items);
    }

    /// Creates or updates variants.
    pub fn upsert_variants(&self, ctx: &RequestContext, items: Vec<ProductVariant>) {
        self.upsert(&self.variants, ctx, items);
    }

    /// Deletes products.
    pub fn delete_products(&self, ctx: &RequestContext, ids: &[EntityId]) {
        self.delete(&self.products, ctx, ids);
    }

    /// Deletes variants.
    pub fn delete_variants(&self, ctx: &RequestContext, ids: &[EntityId]) {
        self.delete(&self.variants, ctx, ids);
    }

    fn upsert<E: Entity>(&self, table: &MemoryTable<E>, ctx: &RequestContext, items: Vec<E>) {
        let (created, updated) = table.upsert(items);
        debug!(
            kind = %E::KIND,
            created = created.len(),
            updated = updated.len(),
            "Catalog upsert"
        );

        self.emit::<E>(EventType::Created, created, ctx);
        self.emit::<E>(EventType::Updated, updated, ctx);
    }

    fn delete<E: Entity>(&self, table: &MemoryTable<E>, ctx: &RequestContext, ids: &[EntityId]) {
        let removed = table.remove(ids);
        debug!(kind = %E::KIND, removed = removed.len(), "Catalog delete");

        self.emit::<E>(EventType::Deleted, removed, ctx);
    }

    fn emit<E: Entity>(&self, event_type: EventType, ids: Vec<EntityId>, ctx: &RequestContext) {
        if ids.is_empty() {
            return;
        }
        self.bus
            .publish(LifecycleEvent::new(E::KIND, event_type, ids, ctx.clone()));
    }
}
