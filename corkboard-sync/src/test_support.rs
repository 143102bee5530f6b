//! Test-only helpers for wiring simulated participants.

use crate::cache::CacheStore;
use crate::dispatch::MutationDispatcher;
use crate::error::Result;
use crate::relay::{EventRelay, Subscription};
use crate::source::ContainerSource;
use crate::types::{ChannelKey, ContainerKey, Item, ItemEvent};
use std::sync::Arc;

/// One simulated participant: its own cache, a dispatcher over the shared
/// source, and a subscription to one channel.
pub struct Participant {
    pub cache: Arc<CacheStore>,
    pub dispatcher: MutationDispatcher,
    pub subscription: Subscription,
    source: Arc<dyn ContainerSource>,
}

impl Participant {
    /// Join a channel with a fresh, independent cache store.
    pub async fn join(
        source: Arc<dyn ContainerSource>,
        relay: Arc<EventRelay>,
        channel: &ChannelKey,
    ) -> Self {
        let cache = Arc::new(CacheStore::new());
        let subscription = relay.subscribe(channel).await;
        let dispatcher = MutationDispatcher::new(cache.clone(), source.clone(), relay);
        Self {
            cache,
            dispatcher,
            subscription,
            source,
        }
    }

    /// Open a container view: populate this participant's cache entry.
    pub async fn open(&self, key: &ContainerKey) -> Result<Vec<Item>> {
        self.cache.get_or_fetch(key, self.source.as_ref()).await
    }

    /// Receive one relayed event and reconcile it into this participant's
    /// cache.
    pub async fn sync_one(&mut self) -> Result<ItemEvent> {
        self.subscription.apply_next(&self.cache).await
    }

    /// Drain every event currently queued on the subscription.
    pub async fn sync_pending(&mut self) -> Result<usize> {
        let mut applied = 0;
        while !self.subscription.is_empty() {
            self.sync_one().await?;
            applied += 1;
        }
        Ok(applied)
    }
}
