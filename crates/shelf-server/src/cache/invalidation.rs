//! Event-driven cache invalidation.
//!
//! A single listener consumes lifecycle events for every cached kind:
//!
//! - `created` / `updated`: invalidate every id, then repopulate every id
//! - `deleted`: invalidate only
//!
//! Each id is handled on its own. A failed repopulation is logged and counted
//! and never stops the remaining ids or the listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use shelf_core::LifecycleEvent;
use shelf_source::{EventSubscription, SubscriptionError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::registry::CacheRegistry;

/// Resultado de procesar un evento.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventOutcome {
    /// Entradas borradas.
    pub invalidated: usize,
    /// Entradas reescritas desde el source.
    pub repopulated: usize,
    /// Ids cuya repoblacion fallo.
    pub failed: usize,
}

/// Handle del listener en background.
pub struct ListenerHandle {
    shutdown_tx: watch::Sender<bool>,
    processed: Arc<AtomicU64>,
}

impl ListenerHandle {
    /// Detiene el listener.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Numero de eventos procesados hasta ahora.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Listener de eventos de ciclo de vida.
#[derive(Clone)]
pub struct InvalidationListener {
    registry: CacheRegistry,
}

impl InvalidationListener {
    pub fn new(registry: CacheRegistry) -> Self {
        Self { registry }
    }

    /// Applies one event to the cache of its kind.
    pub async fn handle_event(&self, event: &LifecycleEvent) -> EventOutcome {
        let mut outcome = EventOutcome::default();

        let Some(cache) = self.registry.get(event.kind) else {
            warn!(kind = %event.kind, "No cache registered for event kind, ignoring");
            return outcome;
        };

        for id in &event.entity_ids {
            cache.invalidate(*id).await;
            outcome.invalidated += 1;
        }

        if event.event_type.repopulates() {
            for id in &event.entity_ids {
                match cache.populate(&event.ctx, *id).await {
                    Ok(true) => outcome.repopulated += 1,
                    Ok(false) => {
                        debug!(kind = %event.kind, id = %id, "Entity gone before repopulation");
                    },
                    Err(e) => {
                        outcome.failed += 1;
                        warn!(
                            kind = %event.kind,
                            id = %id,
                            transient = e.is_transient(),
                            error = %e,
                            "Failed to repopulate cache entry"
                        );
                    },
                }
            }
        }

        debug!(
            kind = %event.kind,
            event_type = %event.event_type,
            invalidated = outcome.invalidated,
            repopulated = outcome.repopulated,
            failed = outcome.failed,
            "Lifecycle event applied"
        );

        outcome
    }

    /// Starts consuming `subscription` in a background task.
    pub fn start(self, subscription: EventSubscription) -> ListenerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let processed = Arc::new(AtomicU64::new(0));
        let handle = ListenerHandle {
            shutdown_tx,
            processed: processed.clone(),
        };

        tokio::spawn(self.run(subscription, shutdown_rx, processed));

        handle
    }

    async fn run(
        self,
        mut subscription: EventSubscription,
        mut shutdown_rx: watch::Receiver<bool>,
        processed: Arc<AtomicU64>,
    ) {
        info!(kinds = ?self.registry.kinds(), "Starting cache invalidation listener");

        loop {
            tokio::select! {
                received = subscription.recv() => match received {
                    Ok(event) => {
                        self.handle_event(&event).await;
                        processed.fetch_add(1, Ordering::Release);
                    },
                    Err(SubscriptionError::Lagged(missed)) => {
                        // Missed entries stay stale until their TTL expires
                        warn!(missed = missed, "Invalidation listener lagged behind the event bus");
                    },
                    Err(SubscriptionError::Closed) => {
                        info!("Event bus closed, stopping invalidation listener");
                        break;
                    },
                },
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Invalidation listener shutting down");
                        break;
                    }
                }
            }
        }
    }
}
