//! Read-through cache for one kind of catalog entity.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use shelf_core::{Entity, EntityId, EntityKind, RequestContext};
use shelf_source::{PageRequest, SourceError, SourceOfRecord};
use tracing::{debug, info, warn};

use super::keys::KeySpace;
use super::store::CacheStore;

/// TTL de las entidades cacheadas (default: 3600 = 1 hora).
pub const DEFAULT_ENTITY_TTL: Duration = Duration::from_secs(3600);

/// Politica para ids que no existen en el source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeCaching {
    /// Cada lookup de un id inexistente consulta el source.
    #[default]
    Disabled,
    /// Guarda un marcador `null` durante `ttl`.
    Enabled { ttl: Duration },
}

impl NegativeCaching {
    pub fn is_enabled(&self) -> bool {
        matches!(self, NegativeCaching::Enabled { .. })
    }
}

/// Resultado de una pasada de warmup para un tipo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    pub kind: EntityKind,
    /// Paginas pedidas al source.
    pub pages: usize,
    /// Entidades recibidas.
    pub scanned: usize,
    /// Entidades escritas en cache.
    pub cached: usize,
    /// Escrituras rechazadas por el backend.
    pub failed: usize,
}

impl WarmupReport {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            pages: 0,
            scanned: 0,
            cached: 0,
            failed: 0,
        }
    }
}

/// Read-through cache over a [`SourceOfRecord`].
///
/// Reads try the store first and fall back to the source, writing what they
/// find. The service owns the `<namespace>:<kind>:` key prefix.
pub struct EntityCache<E: Entity> {
    store: CacheStore,
    source: Arc<dyn SourceOfRecord<E>>,
    keys: KeySpace,
    ttl: Duration,
    negative: NegativeCaching,
}

impl<E: Entity> EntityCache<E> {
    /// Crea el servicio con TTL por defecto y sin negative caching.
    pub fn new(
        store: CacheStore,
        source: Arc<dyn SourceOfRecord<E>>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            keys: KeySpace::new(namespace, E::KIND),
            ttl: DEFAULT_ENTITY_TTL,
            negative: NegativeCaching::Disabled,
        }
    }

    /// Builder: TTL de las entradas.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Builder: politica de negative caching.
    pub fn with_negative_caching(mut self, negative: NegativeCaching) -> Self {
        self.negative = negative;
        self
    }

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Returns the entity, reading the source only on a cache miss.
    ///
    /// A found entity is written back before returning. A failed write does
    /// not fail the lookup.
    ///
    /// # Errors
    ///
    /// Returns the source's error unchanged when the cache misses and the
    /// source read fails.
    pub async fn lookup(&self, ctx: &RequestContext, id: EntityId) -> Result<Option<E>, SourceError> {
        let key = self.keys.key(id).to_string();

        // Option<E> also decodes the negative marker (`null`)
        match self.store.get::<Option<E>>(&key).await {
            Some(Some(entity)) => return Ok(Some(entity)),
            Some(None) if self.negative.is_enabled() => {
                debug!(key = %key, "negative cache hit");
                return Ok(None);
            },
            _ => {},
        }

        match self.source.find_one(ctx, id).await? {
            Some(entity) => {
                self.store.set(&key, &entity, self.ttl).await;
                Ok(Some(entity))
            },
            None => {
                if let NegativeCaching::Enabled { ttl } = self.negative {
                    self.store.set(&key, &Option::<E>::None, ttl).await;
                }
                debug!(kind = %E::KIND, id = %id, "Entity not found in source");
                Ok(None)
            },
        }
    }

    /// Deletes the cached entry. Never fails.
    pub async fn invalidate(&self, id: EntityId) {
        let key = self.keys.key(id).to_string();
        self.store.delete(&key).await;
    }

    /// Reads the entity from the source and writes it, ignoring the cache.
    ///
    /// Returns `true` when the entity exists and was written.
    pub async fn populate(&self, ctx: &RequestContext, id: EntityId) -> Result<bool, SourceError> {
        let Some(entity) = self.source.find_one(ctx, id).await? else {
            debug!(kind = %E::KIND, id = %id, "Nothing to populate");
            return Ok(false);
        };

        let key = self.keys.key(id).to_string();
        Ok(self.store.set(&key, &entity, self.ttl).await)
    }

    /// Scans the whole source page by page and caches every entity.
    ///
    /// Stops on an empty page, a short page, or once `total_count` is reached.
    pub async fn warm(
        &self,
        ctx: &RequestContext,
        page_size: usize,
    ) -> Result<WarmupReport, SourceError> {
        let start = Instant::now();
        let mut report = WarmupReport::new(E::KIND);
        let mut request = PageRequest::first(page_size.max(1));

        loop {
            let page = self.source.find_all(ctx, request).await?;
            report.pages += 1;
            report.scanned += page.items.len();

            for entity in &page.items {
                let key = self.keys.key(entity.id()).to_string();
                if self.store.set(&key, entity, self.ttl).await {
                    report.cached += 1;
                } else {
                    report.failed += 1;
                }
            }

            debug!(
                kind = %E::KIND,
                skip = request.skip,
                received = page.items.len(),
                total = page.total_count,
                "Warmup page cached"
            );

            if !page.has_more(&request) {
                break;
            }
            request = request.next();
        }

        if report.failed > 0 {
            warn!(kind = %E::KIND, failed = report.failed, "Some warmup writes were rejected");
        }
        info!(
            kind = %E::KIND,
            cached = report.cached,
            pages = report.pages,
            duration_ms = start.elapsed().as_millis() as u64,
            "Cache warmed"
        );

        Ok(report)
    }

    /// Elimina todas las entradas del tipo. Retorna cuantas se borraron.
    pub async fn flush(&self) -> usize {
        self.store.delete_by_pattern(&self.keys.pattern()).await
    }
}

/// Type-erased view of an [`EntityCache`], used by the listener, warmup and
/// admin routes, which work per [`EntityKind`] rather than per entity type.
#[async_trait]
pub trait ManagedCache: Send + Sync {
    fn kind(&self) -> EntityKind;

    async fn invalidate(&self, id: EntityId);

    async fn populate(&self, ctx: &RequestContext, id: EntityId) -> Result<bool, SourceError>;

    async fn warm(&self, ctx: &RequestContext, page_size: usize)
    -> Result<WarmupReport, SourceError>;

    async fn flush(&self) -> usize;
}

#[async_trait]
impl<E: Entity> ManagedCache for EntityCache<E> {
    fn kind(&self) -> EntityKind {
        E::KIND
    }

    async fn invalidate(&self, id: EntityId) {
        EntityCache::invalidate(self, id).await
    }

    async fn populate(&self, ctx: &RequestContext, id: EntityId) -> Result<bool, SourceError> {
        EntityCache::populate(self, ctx, id).await
    }

    async fn warm(
        &self,
        ctx: &RequestContext,
        page_size: usize,
    ) -> Result<WarmupReport, SourceError> {
        EntityCache::warm(self, ctx, page_size).await
    }

    async fn flush(&self) -> usize {
        EntityCache::flush(self).await
    }
}
