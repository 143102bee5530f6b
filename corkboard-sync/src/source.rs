//! The container data source seam.
//!
//! The engine never talks to storage directly; it goes through this trait.
//! The authoritative side (database, HTTP API, or the in-memory reference
//! store in `corkboard-store`) implements it, and `persist_*` return the
//! canonical post-write state, which may differ from what was requested.

use crate::error::SourceError;
use crate::types::{ContainerKey, Item, ItemId, Payload};
use async_trait::async_trait;

/// Result type for data-source calls
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Authoritative reads and writes for ordered containers
#[async_trait]
pub trait ContainerSource: Send + Sync {
    /// Current membership of a container, sorted by position
    async fn fetch_items(&self, key: &ContainerKey) -> SourceResult<Vec<Item>>;

    /// Persist a position (and possibly container) change for an item.
    /// Returns the canonical post-write item.
    async fn persist_move(
        &self,
        id: &ItemId,
        container: &ContainerKey,
        position: f64,
    ) -> SourceResult<Item>;

    /// Persist a brand-new item. Returns the canonical item, id included.
    async fn persist_create(
        &self,
        container: &ContainerKey,
        payload: Payload,
        position: f64,
    ) -> SourceResult<Item>;

    /// Persist a removal. Returns the removed item for event fan-out.
    async fn persist_remove(&self, id: &ItemId) -> SourceResult<Item>;
}

#[async_trait]
impl<S: ContainerSource + ?Sized> ContainerSource for std::sync::Arc<S> {
    async fn fetch_items(&self, key: &ContainerKey) -> SourceResult<Vec<Item>> {
        (**self).fetch_items(key).await
    }

    async fn persist_move(
        &self,
        id: &ItemId,
        container: &ContainerKey,
        position: f64,
    ) -> SourceResult<Item> {
        (**self).persist_move(id, container, position).await
    }

    async fn persist_create(
        &self,
        container: &ContainerKey,
        payload: Payload,
        position: f64,
    ) -> SourceResult<Item> {
        (**self).persist_create(container, payload, position).await
    }

    async fn persist_remove(&self, id: &ItemId) -> SourceResult<Item> {
        (**self).persist_remove(id).await
    }
}
