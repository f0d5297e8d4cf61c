//! Entity lifecycle events.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{EntityId, EntityKind, RequestContext};

/// What happened to the entities of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Created,
    Updated,
    Deleted,
}

impl EventType {
    /// Returns true if the entities still exist after the event and should be
    /// written back to the cache.
    pub fn repopulates(&self) -> bool {
        matches!(self, EventType::Created | EventType::Updated)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Created => "created",
            EventType::Updated => "updated",
            EventType::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Notification emitted by the source of record on every mutation.
///
/// A single event may carry several entities of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub kind: EntityKind,
    pub event_type: EventType,
    pub entity_ids: Vec<EntityId>,
    pub ctx: RequestContext,
}

impl LifecycleEvent {
    /// Creates a new event.
    pub fn new(
        kind: EntityKind,
        event_type: EventType,
        entity_ids: impl IntoIterator<Item = EntityId>,
        ctx: RequestContext,
    ) -> Self {
        Self {
            kind,
            event_type,
            entity_ids: entity_ids.into_iter().collect(),
            ctx,
        }
    }

    /// Event for a single entity.
    pub fn single(
        kind: EntityKind,
        event_type: EventType,
        id: EntityId,
        ctx: RequestContext,
    ) -> Self {
        Self::new(kind, event_type, [id], ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repopulates() {
        assert!(EventType::Created.repopulates());
        assert!(EventType::Updated.repopulates());
        assert!(!EventType::Deleted.repopulates());
    }

    #[test]
    fn test_event_keeps_id_order() {
        let event = LifecycleEvent::new(
            EntityKind::Product,
            EventType::Updated,
            [EntityId::new(9), EntityId::new(2), EntityId::new(5)],
            RequestContext::system(),
        );

        let ids: Vec<u64> = event.entity_ids.iter().map(EntityId::get).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn test_event_serialization() {
        let event = LifecycleEvent::single(
            EntityKind::ProductVariant,
            EventType::Deleted,
            EntityId::new(3),
            RequestContext::system(),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "product_variant");
        assert_eq!(json["event_type"], "deleted");
        assert_eq!(json["entity_ids"][0], 3);
    }
}
