//! Container-mutation events carried by the relay.

use super::container::ContainerKey;
use super::item::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete container mutation, carrying the full post-mutation item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub item: Item,
    /// For moves: the container the item left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_container: Option<ContainerKey>,
    pub at: DateTime<Utc>,
}

/// Event discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    ItemCreated,
    ItemUpdated,
    ItemRemoved,
    ItemMoved,
}

impl ItemEvent {
    pub fn created(item: Item) -> Self {
        Self::new(EventKind::ItemCreated, item, None)
    }

    pub fn updated(item: Item) -> Self {
        Self::new(EventKind::ItemUpdated, item, None)
    }

    pub fn removed(item: Item) -> Self {
        Self::new(EventKind::ItemRemoved, item, None)
    }

    /// A move event; `prior` is set only when the container changed.
    pub fn moved(item: Item, prior: Option<ContainerKey>) -> Self {
        Self::new(EventKind::ItemMoved, item, prior)
    }

    fn new(kind: EventKind, item: Item, prior_container: Option<ContainerKey>) -> Self {
        Self {
            kind,
            item,
            prior_container,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names() {
        let json = serde_json::to_string(&EventKind::ItemMoved).unwrap();
        assert_eq!(json, "\"item-moved\"");
    }

    #[test]
    fn test_prior_container_omitted_for_same_container_moves() {
        let item = Item::with_id("a", ContainerKey::inbox("u1"), "t", 1000.0);
        let event = ItemEvent::moved(item, None);
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("prior_container"));
    }
}
