//! In-memory authoritative container store.

use async_trait::async_trait;
use corkboard_sync::source::{ContainerSource, SourceResult};
use corkboard_sync::{position, ContainerKey, Item, ItemId, Payload, SourceError};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// The reference authoritative store: one map of items, one registry of
/// known containers. A single write lock serializes all writes, which gives
/// the per-item write serialization the engine assumes.
///
/// Containers are created and destroyed by the owning collaborator (list
/// CRUD); here that is [`register_container`](Self::register_container).
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<ItemId, Item>>,
    containers: RwLock<HashSet<ContainerKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a container so items can live in it.
    pub async fn register_container(&self, key: ContainerKey) {
        self.containers.write().await.insert(key);
    }

    /// Insert an item directly, registering its container. Setup helper for
    /// tests and fixtures; real mutations go through [`ContainerSource`].
    pub async fn seed(&self, item: Item) {
        self.register_container(item.container.clone()).await;
        self.items.write().await.insert(item.id.clone(), item);
    }

    async fn ensure_container(&self, key: &ContainerKey) -> SourceResult<()> {
        if self.containers.read().await.contains(key) {
            Ok(())
        } else {
            Err(SourceError::validation(format!(
                "unknown container: {}",
                key
            )))
        }
    }
}

#[async_trait]
impl ContainerSource for MemoryStore {
    async fn fetch_items(&self, key: &ContainerKey) -> SourceResult<Vec<Item>> {
        self.ensure_container(key)
            .await
            .map_err(|_| SourceError::not_found(key))?;

        let items = self.items.read().await;
        let mut members: Vec<Item> = items
            .values()
            .filter(|item| &item.container == key)
            .cloned()
            .collect();
        members.sort_by(position::order);
        Ok(members)
    }

    async fn persist_move(
        &self,
        id: &ItemId,
        container: &ContainerKey,
        position: f64,
    ) -> SourceResult<Item> {
        self.ensure_container(container).await?;

        let mut items = self.items.write().await;
        let item = items
            .get_mut(id)
            .ok_or_else(|| SourceError::not_found(id))?;
        item.container = container.clone();
        item.position = position;
        tracing::debug!(item = %id, container = %container, position, "persisted move");
        Ok(item.clone())
    }

    async fn persist_create(
        &self,
        container: &ContainerKey,
        payload: Payload,
        position: f64,
    ) -> SourceResult<Item> {
        self.ensure_container(container).await?;

        let item = Item::new(container.clone(), payload, position);
        let mut items = self.items.write().await;
        items.insert(item.id.clone(), item.clone());
        tracing::debug!(item = %item.id, container = %container, "persisted create");
        Ok(item)
    }

    async fn persist_remove(&self, id: &ItemId) -> SourceResult<Item> {
        let mut items = self.items.write().await;
        let removed = items
            .remove(id)
            .ok_or_else(|| SourceError::not_found(id))?;
        tracing::debug!(item = %id, "persisted remove");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(name: &str) -> ContainerKey {
        ContainerKey::list_cards("b1", name)
    }

    async fn setup() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(Item::with_id("a", list("l1"), "A", 2000.0)).await;
        store.seed(Item::with_id("b", list("l1"), "B", 1000.0)).await;
        store
    }

    #[tokio::test]
    async fn test_fetch_is_sorted() {
        let store = setup().await;
        let items = store.fetch_items(&list("l1")).await.unwrap();
        assert_eq!(items[0].id.as_str(), "b");
        assert_eq!(items[1].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_fetch_unknown_container() {
        let store = setup().await;
        let result = store.fetch_items(&list("nope")).await;
        assert!(matches!(result, Err(SourceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_move_returns_canonical_item() {
        let store = setup().await;
        store.register_container(list("l2")).await;

        let moved = store
            .persist_move(&ItemId::from("a"), &list("l2"), 1000.0)
            .await
            .unwrap();
        assert_eq!(moved.container, list("l2"));

        assert_eq!(store.fetch_items(&list("l1")).await.unwrap().len(), 1);
        assert_eq!(store.fetch_items(&list("l2")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_move_to_unknown_container_is_validation() {
        let store = setup().await;
        let result = store
            .persist_move(&ItemId::from("a"), &list("nope"), 1000.0)
            .await;
        assert!(matches!(result, Err(SourceError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_move_unknown_item_is_not_found() {
        let store = setup().await;
        let result = store
            .persist_move(&ItemId::from("ghost"), &list("l1"), 1.0)
            .await;
        assert!(matches!(result, Err(SourceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_then_remove() {
        let store = setup().await;
        let created = store
            .persist_create(&list("l1"), Payload::titled("C"), 3000.0)
            .await
            .unwrap();

        let removed = store.persist_remove(&created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert!(matches!(
            store.persist_remove(&created.id).await,
            Err(SourceError::NotFound { .. })
        ));
    }
}
