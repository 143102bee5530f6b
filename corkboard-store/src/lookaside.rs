//! Server-side lookaside cache.
//!
//! A short-TTL read-through cache in front of a [`ContainerSource`], shared
//! by every participant's authoritative requests for a container. Writes go
//! straight through; after a successful write the cached entries are
//! updated unconditionally, so a hit within the TTL still reflects the
//! write. The cache is best-effort: losing an update only risks a stale
//! read until the TTL expires, never a lost write.

use async_trait::async_trait;
use corkboard_sync::source::{ContainerSource, SourceResult};
use corkboard_sync::{position, ContainerKey, Item, ItemId, Payload};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct Entry {
    cached_at: Instant,
    items: Vec<Item>,
}

/// TTL-bounded read-through cache over any container source
#[derive(Debug)]
pub struct Lookaside<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<ContainerKey, Entry>>,
}

impl<S> Lookaside<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Reflect a successful write into every cached entry holding the item.
    async fn absorb_write(&self, item: &Item) {
        let mut entries = self.entries.write().await;
        for (key, entry) in entries.iter_mut() {
            entry.items.retain(|cached| cached.id != item.id);
            if key == &item.container {
                entry.items.push(item.clone());
                entry.items.sort_by(position::order);
            }
        }
    }

    async fn absorb_removal(&self, id: &ItemId) {
        let mut entries = self.entries.write().await;
        for entry in entries.values_mut() {
            entry.items.retain(|cached| &cached.id != id);
        }
    }
}

#[async_trait]
impl<S: ContainerSource> ContainerSource for Lookaside<S> {
    async fn fetch_items(&self, key: &ContainerKey) -> SourceResult<Vec<Item>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.cached_at.elapsed() < self.ttl {
                    tracing::debug!(container = %key, "lookaside hit");
                    return Ok(entry.items.clone());
                }
            }
        }

        let items = self.inner.fetch_items(key).await?;
        let mut entries = self.entries.write().await;
        entries.insert(
            key.clone(),
            Entry {
                cached_at: Instant::now(),
                items: items.clone(),
            },
        );
        Ok(items)
    }

    async fn persist_move(
        &self,
        id: &ItemId,
        container: &ContainerKey,
        position: f64,
    ) -> SourceResult<Item> {
        let canonical = self.inner.persist_move(id, container, position).await?;
        self.absorb_write(&canonical).await;
        Ok(canonical)
    }

    async fn persist_create(
        &self,
        container: &ContainerKey,
        payload: Payload,
        position: f64,
    ) -> SourceResult<Item> {
        let canonical = self.inner.persist_create(container, payload, position).await?;
        self.absorb_write(&canonical).await;
        Ok(canonical)
    }

    async fn persist_remove(&self, id: &ItemId) -> SourceResult<Item> {
        let removed = self.inner.persist_remove(id).await?;
        self.absorb_removal(id).await;
        Ok(removed)
    }
}
