//! Core types for the synchronization engine

mod container;
mod event;
mod ids;
mod item;

pub use container::{ChannelKey, ContainerKey};
pub use event::{EventKind, ItemEvent};
pub use ids::{BoardId, ItemId, UserId};
pub use item::{Item, Payload};
