//! Shelf Server binary.

use std::sync::Arc;

use anyhow::Context;
use shelf_core::{Product, ProductVariant};
use shelf_server::metrics::init_metrics;
use shelf_server::warmup::WarmupState;
use shelf_server::{
    AppState, CacheWarmer, EntityCache, InvalidationListener, WarmupScheduler, connect_store,
    create_router, load_config, run_server,
};
use shelf_source::{CatalogSeed, EventBus, MemorySource};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("SHELF_CONFIG_FILE").ok();
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    let addr = config.server.addr()?;

    info!("Starting Shelf Server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        namespace = %config.redis.key_prefix,
        entity_ttl_secs = config.cache.entity_ttl_seconds,
        "Cache configuration loaded"
    );

    let prometheus = init_metrics().context("Failed to install metrics recorder")?;

    // Source of record
    let bus = EventBus::new(config.catalog.event_buffer);
    let catalog = match &config.catalog.seed_path {
        Some(path) => {
            let seed = CatalogSeed::from_file(path)
                .await
                .with_context(|| format!("Failed to read catalog seed {}", path.display()))?;
            MemorySource::with_seed(bus.clone(), seed)
        },
        None => MemorySource::new(bus.clone()),
    };

    // Cache
    let store = connect_store(
        &config.redis,
        config.cache.max_local_entries,
        config.cache.default_ttl(),
    )
    .await;

    let products = Arc::new(
        EntityCache::<Product>::new(store.clone(), catalog.products(), &config.redis.key_prefix)
            .with_ttl(config.cache.entity_ttl())
            .with_negative_caching(config.cache.negative()),
    );
    let variants = Arc::new(
        EntityCache::<ProductVariant>::new(
            store.clone(),
            catalog.variants(),
            &config.redis.key_prefix,
        )
        .with_ttl(config.cache.entity_ttl())
        .with_negative_caching(config.cache.negative()),
    );

    let mut state = AppState::new(store.clone(), products, variants);

    // Catalog writers publish lifecycle events on `bus`; the seeded source never does
    let listener = InvalidationListener::new(state.registry().clone()).start(bus.subscribe());

    let warmup = if config.warmup.enabled {
        let warmer = CacheWarmer::new(
            state.registry().clone(),
            Arc::new(WarmupState::new()),
            config.warmup.page_size,
        );
        state = state.with_warmer(warmer.clone());
        Some(WarmupScheduler::new(warmer, config.warmup.scheduler_config()).start())
    } else {
        info!("Cache warmup disabled");
        None
    };

    let result = run_server(addr, create_router(state, prometheus)).await;

    listener.stop();
    if let Some(handle) = warmup {
        handle.stop();
    }
    store.close();

    result.context("Server error")?;
    info!("Shelf Server stopped");
    Ok(())
}
