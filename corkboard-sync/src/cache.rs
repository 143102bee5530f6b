//! Per-container cached snapshots and their reconciliation.
//!
//! Every participant holds a [`CacheStore`]: a map from container key to the
//! container's last known sorted membership. The same merge is used for
//! local optimistic patches and for events echoed back by the relay, and it
//! is idempotent — the same logical mutation arriving twice (once
//! optimistically, once authoritatively) converges without sequence numbers.

use crate::error::{Result, SyncError};
use crate::position;
use crate::source::ContainerSource;
use crate::types::{ContainerKey, EventKind, Item, ItemEvent, ItemId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A mutation applied to one container's cache entry
#[derive(Debug, Clone, PartialEq)]
pub enum CachePatch {
    /// Upsert by identifier: insert if absent, overwrite fields and position
    /// if present
    Insert(Item),
    /// Reposition an already-cached item; unknown identifiers are ignored
    /// (the full item will arrive with its authoritative event)
    UpdatePosition { id: ItemId, position: f64 },
    /// Drop an item from the entry
    Remove(ItemId),
    /// Replace the whole entry (fetch results)
    ReplaceAll(Vec<Item>),
}

/// One container's materialized, possibly-stale membership.
///
/// Invariant: sorted by `(position, id)` and free of duplicate identifiers
/// after every patch.
#[derive(Debug, Clone, Default)]
pub struct ContainerCache {
    items: Vec<Item>,
}

impl ContainerCache {
    fn new(items: Vec<Item>) -> Self {
        let mut cache = Self { items };
        cache.normalize();
        cache
    }

    /// Current sorted snapshot
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Apply a patch; see [`CachePatch`] for the per-variant merge rules.
    pub fn apply(&mut self, key: &ContainerKey, patch: CachePatch) {
        match patch {
            CachePatch::Insert(mut item) => {
                // An entry only ever holds items addressed to its own key.
                item.container = key.clone();
                self.items.retain(|existing| existing.id != item.id);
                self.items.push(item);
            }
            CachePatch::UpdatePosition { id, position } => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                    item.position = position;
                }
            }
            CachePatch::Remove(id) => {
                self.items.retain(|item| item.id != id);
            }
            CachePatch::ReplaceAll(items) => {
                self.items = items;
            }
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        self.items.sort_by(position::order);
        // Keep the most recently applied copy of a duplicated id. Insert
        // already guarantees uniqueness; this guards ReplaceAll input.
        let mut seen = Vec::with_capacity(self.items.len());
        let mut deduped = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..).rev() {
            if !seen.contains(&item.id) {
                seen.push(item.id.clone());
                deduped.push(item);
            }
        }
        deduped.reverse();
        deduped.sort_by(position::order);
        self.items = deduped;
    }
}

/// All cache entries of one participant, keyed by container.
///
/// Deliberately injectable: every component takes the store it works against,
/// so tests (and multiple simulated participants) run independent stores.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: RwLock<HashMap<ContainerKey, ContainerCache>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted items of a populated entry, `None` if the container was never
    /// read on this participant.
    pub async fn get(&self, key: &ContainerKey) -> Option<Vec<Item>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|cache| cache.items().to_vec())
    }

    /// Items of `key`, fetching from the data source on a miss.
    ///
    /// A failed fetch never discards an existing snapshot — a stale view
    /// beats an empty one — but a miss-plus-failure surfaces the error.
    pub async fn get_or_fetch(
        &self,
        key: &ContainerKey,
        source: &dyn ContainerSource,
    ) -> Result<Vec<Item>> {
        if let Some(items) = self.get(key).await {
            return Ok(items);
        }

        match source.fetch_items(key).await {
            Ok(items) => {
                tracing::debug!(container = %key, count = items.len(), "populated cache entry");
                let mut entries = self.entries.write().await;
                let cache = entries
                    .entry(key.clone())
                    .or_insert_with(|| ContainerCache::new(items));
                Ok(cache.items().to_vec())
            }
            Err(source_error) => Err(SyncError::Fetch {
                key: key.clone(),
                source: source_error,
            }),
        }
    }

    /// Apply a patch to a populated entry.
    ///
    /// Entries are created by reads, not by patches: a participant that
    /// never opened a container has nothing to reconcile, and its first read
    /// fetches the authoritative membership anyway. `ReplaceAll` is the
    /// exception — it *is* a read result.
    pub async fn apply(&self, key: &ContainerKey, patch: CachePatch) {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(cache) => cache.apply(key, patch),
            None => {
                if let CachePatch::ReplaceAll(items) = patch {
                    entries.insert(key.clone(), ContainerCache::new(items));
                } else {
                    tracing::debug!(container = %key, "patch skipped, entry not populated");
                }
            }
        }
    }

    /// Merge a relayed event. Moves touch two entries: removal from the
    /// prior container and an upsert into the current one.
    pub async fn apply_event(&self, event: &ItemEvent) {
        let item = &event.item;
        match event.kind {
            EventKind::ItemCreated | EventKind::ItemUpdated => {
                self.apply(&item.container, CachePatch::Insert(item.clone()))
                    .await;
            }
            EventKind::ItemRemoved => {
                self.apply(&item.container, CachePatch::Remove(item.id.clone()))
                    .await;
            }
            EventKind::ItemMoved => {
                if let Some(prior) = &event.prior_container {
                    if prior != &item.container {
                        self.apply(prior, CachePatch::Remove(item.id.clone())).await;
                    }
                }
                self.apply(&item.container, CachePatch::Insert(item.clone()))
                    .await;
            }
        }
    }

    /// Pre-commit snapshot of an entry for the dispatcher's revert path.
    /// `None` snapshots an unpopulated entry (and restores to unpopulated).
    pub async fn snapshot(&self, key: &ContainerKey) -> Option<Vec<Item>> {
        self.get(key).await
    }

    /// Restore an entry to a previously captured snapshot.
    pub async fn restore(&self, key: &ContainerKey, snapshot: Option<Vec<Item>>) {
        let mut entries = self.entries.write().await;
        match snapshot {
            Some(items) => {
                entries.insert(key.clone(), ContainerCache::new(items));
            }
            None => {
                entries.remove(key);
            }
        }
    }

    /// Drop an entry (view unmounted, TTL expiry on the server side).
    pub async fn invalidate(&self, key: &ContainerKey) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    /// Look up which populated entry currently holds an item.
    pub async fn find_item(&self, id: &ItemId) -> Option<Item> {
        let entries = self.entries.read().await;
        entries
            .values()
            .flat_map(|cache| cache.items())
            .find(|item| &item.id == id)
            .cloned()
    }
}
