//! In-process publish/subscribe bus for entity lifecycle events.

use shelf_core::{EntityKind, LifecycleEvent};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default number of events buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Errors returned when receiving from a subscription.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    /// The subscriber fell behind and the oldest events were dropped.
    #[error("subscriber lagged, {0} events missed")]
    Lagged(u64),

    /// Every publisher is gone.
    #[error("event bus closed")]
    Closed,
}

/// Broadcast bus for [`LifecycleEvent`]s.
///
/// Cloning the bus is cheap and every clone publishes to the same
/// subscribers. Delivery is asynchronous; events for different entities are
/// not ordered relative to each other from a consumer's point of view.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to every current subscriber.
    ///
    /// Returns the number of subscribers that will see the event. Publishing
    /// with no subscriber is not an error.
    pub fn publish(&self, event: LifecycleEvent) -> usize {
        debug!(
            kind = %event.kind,
            event_type = %event.event_type,
            count = event.entity_ids.len(),
            "Publishing lifecycle event"
        );

        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribes to every event published from now on.
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
            kind: None,
        }
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A subscription to an [`EventBus`], optionally restricted to one kind.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: broadcast::Receiver<LifecycleEvent>,
    kind: Option<EntityKind>,
}

impl EventSubscription {
    /// Restricts the subscription to events of a single kind.
    pub fn of_kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Waits for the next matching event.
    pub async fn recv(&mut self) -> Result<LifecycleEvent, SubscriptionError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.kind.is_some_and(|kind| kind != event.kind) {
                        trace!(kind = %event.kind, "Skipping event of another kind");
                        continue;
                    }
                    return Ok(event);
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    return Err(SubscriptionError::Lagged(missed));
                },
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }
}
