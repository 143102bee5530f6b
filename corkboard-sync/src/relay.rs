//! Event relay: board-scoped fan-out of container mutations.
//!
//! One broadcast channel per board (plus one per user inbox). A single
//! sender per channel means events for one item are delivered to every
//! subscriber in publish order; no ordering is promised across channels or
//! across different containers, which the idempotent cache merge tolerates.

use crate::cache::CacheStore;
use crate::error::{Result, SyncError};
use crate::types::{ChannelKey, ItemEvent};
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

/// Buffered events per channel before slow subscribers start lagging
const CHANNEL_CAPACITY: usize = 256;

/// Fan-out hub shared by every participant of a deployment
#[derive(Debug, Default)]
pub struct EventRelay {
    channels: RwLock<HashMap<ChannelKey, broadcast::Sender<ItemEvent>>>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a channel. The channel is created on first subscribe and torn
    /// down once the last subscription is dropped.
    pub async fn subscribe(&self, key: &ChannelKey) -> Subscription {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(key.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Subscription {
            receiver: sender.subscribe(),
        }
    }

    /// Deliver an event to every current subscriber of a channel.
    /// Returns the number of subscribers reached; zero is not an error.
    ///
    /// The common case only takes the read lock; the write lock is needed
    /// just to reclaim a channel whose last subscriber has left.
    pub async fn publish(&self, key: &ChannelKey, event: ItemEvent) -> usize {
        {
            let channels = self.channels.read().await;
            match channels.get(key) {
                None => {
                    tracing::debug!(channel = %key, "no subscribers, event dropped");
                    return 0;
                }
                Some(sender) if sender.receiver_count() > 0 => {
                    tracing::debug!(
                        channel = %key,
                        kind = ?event.kind,
                        item = %event.item.id,
                        "publishing event"
                    );
                    return sender.send(event).unwrap_or(0);
                }
                Some(_) => {}
            }
        }

        let mut channels = self.channels.write().await;
        match channels.get(key) {
            // A subscriber raced back in between the two locks.
            Some(sender) if sender.receiver_count() > 0 => sender.send(event).unwrap_or(0),
            Some(_) => {
                channels.remove(key);
                tracing::debug!(channel = %key, "no subscribers, channel reclaimed");
                0
            }
            None => 0,
        }
    }
}

/// A participant's membership of one channel
pub struct Subscription {
    receiver: broadcast::Receiver<ItemEvent>,
}

impl Subscription {
    /// Next event on the channel.
    ///
    /// A lagged subscriber gets [`SyncError::RelayLagged`]; the right
    /// response is to invalidate and re-fetch the affected containers,
    /// since skipped events cannot be recovered.
    pub async fn next(&mut self) -> Result<ItemEvent> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Closed) => Err(SyncError::RelayClosed),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                Err(SyncError::RelayLagged { skipped })
            }
        }
    }

    /// Receive the next event and reconcile it into `cache`.
    pub async fn apply_next(&mut self, cache: &CacheStore) -> Result<ItemEvent> {
        let event = self.next().await?;
        cache.apply_event(&event).await;
        Ok(event)
    }

    /// Number of events queued and not yet received
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
