//! Mutation dispatch: optimistic local patches with authoritative
//! reconciliation.
//!
//! Every mutation follows the same two-phase shape: snapshot the touched
//! cache entries, apply optimistic patches so the acting participant sees
//! the change instantly, run the authoritative request, then either confirm
//! (apply the canonical result, publish the event) or restore every
//! snapshot. A cross-container move stages the source removal and the
//! target insertion inside one transaction, so a failure can never leave
//! the item in both containers or in neither.
//!
//! This is the only component that classifies persistence failures and the
//! only one allowed to surface user-visible errors.

use crate::cache::{CachePatch, CacheStore};
use crate::drag::DropCommit;
use crate::error::{Result, SourceError, SyncError};
use crate::position::{self, Anchor, Edge};
use crate::relay::EventRelay;
use crate::source::ContainerSource;
use crate::types::{ContainerKey, Item, ItemEvent, ItemId, Payload};
use std::sync::Arc;

/// Turns committed drops (and programmatic moves) into optimistic cache
/// patches plus authoritative requests.
pub struct MutationDispatcher {
    cache: Arc<CacheStore>,
    source: Arc<dyn ContainerSource>,
    relay: Arc<EventRelay>,
}

impl MutationDispatcher {
    pub fn new(
        cache: Arc<CacheStore>,
        source: Arc<dyn ContainerSource>,
        relay: Arc<EventRelay>,
    ) -> Self {
        Self {
            cache,
            source,
            relay,
        }
    }

    /// The participant's cache store (for rendering and event loops).
    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Commit a finished drag gesture.
    pub async fn commit_drop(&self, drop: DropCommit) -> Result<Item> {
        self.commit(&drop.item, &drop.source, &drop.target, drop.anchor, drop.edge)
            .await
    }

    /// Move an item to `anchor`/`edge` inside `target_key`, possibly leaving
    /// `source_key`. Optimistic patches land before the request is sent; on
    /// failure both containers are restored to their pre-commit snapshots.
    pub async fn commit(
        &self,
        id: &ItemId,
        source_key: &ContainerKey,
        target_key: &ContainerKey,
        anchor: Anchor,
        edge: Edge,
    ) -> Result<Item> {
        let target_items = self
            .cache
            .get_or_fetch(target_key, self.source.as_ref())
            .await?;
        let cross_container = source_key != target_key;
        if cross_container {
            self.cache
                .get_or_fetch(source_key, self.source.as_ref())
                .await?;
        }

        let moved = self
            .cache
            .find_item(id)
            .await
            .ok_or_else(|| SyncError::UnknownItem { id: id.clone() })?;

        let new_position = position::allocate(&target_items, Some(id), &anchor, edge);

        let tx = Transaction::begin(&self.cache, &[source_key, target_key]).await;
        if cross_container {
            tx.stage(source_key, CachePatch::Remove(id.clone())).await;
            let mut optimistic = moved;
            optimistic.container = target_key.clone();
            optimistic.position = new_position;
            tx.stage(target_key, CachePatch::Insert(optimistic)).await;
        } else {
            tx.stage(
                target_key,
                CachePatch::UpdatePosition {
                    id: id.clone(),
                    position: new_position,
                },
            )
            .await;
        }

        let mut outcome = self.source.persist_move(id, target_key, new_position).await;
        if let Err(error) = &outcome {
            if error.is_transient() {
                tracing::warn!(item = %id, %error, "transient persistence failure, retrying once");
                outcome = self.source.persist_move(id, target_key, new_position).await;
            }
        }

        match outcome {
            Ok(canonical) => {
                tx.confirm();
                // The source may adjust what was requested; the canonical
                // item wins, locally and on the wire. A redirect away from
                // the requested target must also take the optimistic copy
                // with it, or the item ends up cached in two containers.
                if canonical.container != *target_key {
                    self.cache
                        .apply(target_key, CachePatch::Remove(id.clone()))
                        .await;
                }
                self.cache
                    .apply(&canonical.container, CachePatch::Insert(canonical.clone()))
                    .await;
                let prior = (canonical.container != *source_key).then(|| source_key.clone());
                self.publish(
                    &canonical.container,
                    source_key,
                    ItemEvent::moved(canonical.clone(), prior),
                )
                .await;
                tracing::info!(
                    item = %id,
                    from = %source_key,
                    to = %canonical.container,
                    position = canonical.position,
                    "move committed"
                );
                self.rebalance_if_exhausted(&canonical.container).await;
                Ok(canonical)
            }
            Err(error) => {
                tracing::warn!(item = %id, %error, "move failed, reverting optimistic patches");
                tx.rollback().await;
                Err(classify(error))
            }
        }
    }

    /// Create an item at `anchor`/`edge` inside `key`.
    ///
    /// The optimistic copy uses a provisional identifier; once the source
    /// answers, the provisional copy is swapped for the canonical item.
    pub async fn create(
        &self,
        key: &ContainerKey,
        payload: Payload,
        anchor: Anchor,
        edge: Edge,
    ) -> Result<Item> {
        let items = self.cache.get_or_fetch(key, self.source.as_ref()).await?;
        let new_position = position::allocate(&items, None, &anchor, edge);

        let provisional = Item::new(key.clone(), payload.clone(), new_position);
        let provisional_id = provisional.id.clone();

        let tx = Transaction::begin(&self.cache, &[key]).await;
        tx.stage(key, CachePatch::Insert(provisional)).await;

        let mut outcome = self.source.persist_create(key, payload.clone(), new_position).await;
        if let Err(error) = &outcome {
            if error.is_transient() {
                tracing::warn!(container = %key, %error, "transient persistence failure, retrying once");
                outcome = self.source.persist_create(key, payload, new_position).await;
            }
        }

        match outcome {
            Ok(canonical) => {
                tx.confirm();
                if canonical.id != provisional_id {
                    self.cache.apply(key, CachePatch::Remove(provisional_id)).await;
                }
                self.cache
                    .apply(&canonical.container, CachePatch::Insert(canonical.clone()))
                    .await;
                self.relay
                    .publish(&key.channel(), ItemEvent::created(canonical.clone()))
                    .await;
                tracing::info!(item = %canonical.id, container = %key, "create committed");
                self.rebalance_if_exhausted(key).await;
                Ok(canonical)
            }
            Err(error) => {
                tracing::warn!(container = %key, %error, "create failed, reverting optimistic patch");
                tx.rollback().await;
                Err(classify(error))
            }
        }
    }

    /// Remove an item from `key`.
    pub async fn remove(&self, id: &ItemId, key: &ContainerKey) -> Result<Item> {
        self.cache.get_or_fetch(key, self.source.as_ref()).await?;

        let tx = Transaction::begin(&self.cache, &[key]).await;
        tx.stage(key, CachePatch::Remove(id.clone())).await;

        let mut outcome = self.source.persist_remove(id).await;
        if let Err(error) = &outcome {
            if error.is_transient() {
                tracing::warn!(item = %id, %error, "transient persistence failure, retrying once");
                outcome = self.source.persist_remove(id).await;
            }
        }

        match outcome {
            Ok(removed) => {
                tx.confirm();
                self.relay
                    .publish(&key.channel(), ItemEvent::removed(removed.clone()))
                    .await;
                tracing::info!(item = %id, container = %key, "remove committed");
                Ok(removed)
            }
            Err(error) => {
                tracing::warn!(item = %id, %error, "remove failed, reverting optimistic patch");
                tx.rollback().await;
                Err(classify(error))
            }
        }
    }

    /// Deliver an event on the target's channel, and on the source's channel
    /// too when a cross-container move spans channels.
    async fn publish(&self, target: &ContainerKey, source: &ContainerKey, event: ItemEvent) {
        let channel = target.channel();
        self.relay.publish(&channel, event.clone()).await;
        let source_channel = source.channel();
        if source_channel != channel {
            self.relay.publish(&source_channel, event).await;
        }
    }

    /// Renumber a container whose adjacent positions have collapsed below
    /// the midpoint-insertion epsilon.
    ///
    /// Assignments are persisted suffix-first (see
    /// [`position::rebalance`]), so an interrupted renumber leaves the
    /// container compressed but correctly ordered; the next exhausted
    /// insertion retries it.
    async fn rebalance_if_exhausted(&self, key: &ContainerKey) {
        let Some(items) = self.cache.get(key).await else {
            return;
        };
        if !position::needs_rebalance(&items) {
            return;
        }

        tracing::info!(container = %key, count = items.len(), "positions exhausted, renumbering");
        for (id, new_position) in position::rebalance(&items).into_iter().rev() {
            match self.source.persist_move(&id, key, new_position).await {
                Ok(canonical) => {
                    self.cache
                        .apply(key, CachePatch::Insert(canonical.clone()))
                        .await;
                    self.relay
                        .publish(&key.channel(), ItemEvent::updated(canonical))
                        .await;
                }
                Err(error) => {
                    tracing::warn!(item = %id, %error, "renumbering interrupted");
                    return;
                }
            }
        }
    }
}

/// Map a source failure onto the engine's user-facing taxonomy.
fn classify(error: SourceError) -> SyncError {
    if error.is_transient() {
        SyncError::PersistenceTransient { source: error }
    } else {
        SyncError::PersistenceRejected { source: error }
    }
}

/// Pre-commit snapshots of every touched container, restored together on
/// rollback. Confirm consumes the transaction without restoring.
struct Transaction<'a> {
    cache: &'a CacheStore,
    snapshots: Vec<(ContainerKey, Option<Vec<Item>>)>,
}

impl<'a> Transaction<'a> {
    async fn begin(cache: &'a CacheStore, keys: &[&ContainerKey]) -> Transaction<'a> {
        let mut snapshots: Vec<(ContainerKey, Option<Vec<Item>>)> = Vec::with_capacity(keys.len());
        for key in keys {
            if snapshots.iter().any(|(taken, _)| taken == *key) {
                continue;
            }
            snapshots.push(((*key).clone(), cache.snapshot(key).await));
        }
        Transaction { cache, snapshots }
    }

    async fn stage(&self, key: &ContainerKey, patch: CachePatch) {
        self.cache.apply(key, patch).await;
    }

    fn confirm(self) {}

    async fn rollback(self) {
        for (key, snapshot) in self.snapshots {
            self.cache.restore(&key, snapshot).await;
        }
    }
}

