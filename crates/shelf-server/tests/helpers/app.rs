//! Wiring de la aplicacion para tests.

use std::sync::Arc;
use std::time::Duration;

use shelf_core::{Product, ProductVariant, RequestContext};
use shelf_server::cache::{CacheStore, EntityCache, InvalidationListener, ListenerHandle};
use shelf_server::warmup::{CacheWarmer, WarmupState};
use shelf_server::{AppState, create_app_router};
use shelf_source::{CatalogSeed, EventBus, MemorySource};

use super::client::TestClient;

pub const NAMESPACE: &str = "vendure";

pub fn product(id: u64) -> Product {
    Product::new(id, format!("Product {}", id))
}

pub fn variant(id: u64) -> ProductVariant {
    ProductVariant::new(id, 1, format!("SKU-{:05}", id), 1990)
}

/// Catalogo en memoria, cache y estado HTTP conectados entre si.
pub struct TestApp {
    pub bus: EventBus,
    pub catalog: MemorySource,
    pub store: CacheStore,
    pub state: AppState,
}

impl TestApp {
    /// Catalogo vacio sobre un store en memoria.
    pub fn new() -> Self {
        Self::build(CatalogSeed::default(), CacheStore::in_memory())
    }

    /// Catalogo con productos `1..=products` y variantes `1..=variants`.
    pub fn seeded(products: u64, variants: u64) -> Self {
        Self::with_store(products, variants, CacheStore::in_memory())
    }

    pub fn with_store(products: u64, variants: u64, store: CacheStore) -> Self {
        let seed = CatalogSeed {
            products: (1..=products).map(product).collect(),
            variants: (1..=variants).map(variant).collect(),
        };
        Self::build(seed, store)
    }

    fn build(seed: CatalogSeed, store: CacheStore) -> Self {
        let bus = EventBus::new(64);
        let catalog = MemorySource::with_seed(bus.clone(), seed);

        let products = Arc::new(EntityCache::<Product>::new(
            store.clone(),
            catalog.products(),
            NAMESPACE,
        ));
        let variants = Arc::new(EntityCache::<ProductVariant>::new(
            store.clone(),
            catalog.variants(),
            NAMESPACE,
        ));

        let state = AppState::new(store.clone(), products, variants);
        let warmer = CacheWarmer::new(
            state.registry().clone(),
            Arc::new(WarmupState::new()),
            1000,
        );
        let state = state.with_warmer(warmer);

        Self {
            bus,
            catalog,
            store,
            state,
        }
    }

    pub fn client(&self) -> TestClient {
        TestClient::new(create_app_router(self.state.clone()))
    }

    /// Arranca el listener de invalidacion sobre el bus del catalogo.
    pub fn start_listener(&self) -> ListenerHandle {
        InvalidationListener::new(self.state.registry().clone()).start(self.bus.subscribe())
    }

    pub fn admin_ctx(&self) -> RequestContext {
        RequestContext::system()
    }
}

/// Espera hasta que el listener haya procesado `count` eventos.
pub async fn wait_for_events(handle: &ListenerHandle, count: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while handle.processed() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Listener did not process events in time");
}
