//! Item type: the ordered entity the engine synchronizes.

use super::container::ContainerKey;
use super::ids::ItemId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered entity (a card or a list) within one container.
///
/// The engine only cares about `id`, `container` and `position`; the payload
/// is opaque domain data carried along for observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub container: ContainerKey,
    /// Sort key within the container. Not required to be integral; ties are
    /// broken by `id`.
    pub position: f64,
    #[serde(default)]
    pub payload: Payload,
}

impl Item {
    /// Create a new item at the given position
    pub fn new(container: ContainerKey, payload: Payload, position: f64) -> Self {
        Self {
            id: ItemId::new(),
            container,
            position,
            payload,
        }
    }

    /// Test/builder convenience: item with a fixed id and title
    pub fn with_id(
        id: impl Into<ItemId>,
        container: ContainerKey,
        title: impl Into<String>,
        position: f64,
    ) -> Self {
        Self {
            id: id.into(),
            container,
            position,
            payload: Payload::titled(title),
        }
    }
}

/// Domain payload opaque to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub title: String,
    /// Anything else the CRUD layer attaches (labels, due dates, ...)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra: Value,
}

impl Payload {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            extra: Value::Null,
        }
    }
}
