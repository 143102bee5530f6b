//! Test-only helpers: a store with programmable persistence failures.

use async_trait::async_trait;
use corkboard_sync::source::{ContainerSource, SourceResult};
use corkboard_sync::{ContainerKey, Item, ItemId, Payload, SourceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::MemoryStore;

/// Wraps a [`MemoryStore`], failing the next persistence call(s) on demand.
/// Reads always pass through.
pub struct FailingStore {
    inner: Arc<MemoryStore>,
    reject_reason: Mutex<Option<String>>,
    transient_remaining: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            reject_reason: Mutex::new(None),
            transient_remaining: AtomicUsize::new(0),
        }
    }

    /// Make the next persistence call fail with a validation rejection.
    pub fn reject_next(&self, reason: impl Into<String>) {
        *self
            .reject_reason
            .lock()
            .expect("reject_reason lock poisoned") = Some(reason.into());
    }

    /// Make the next `count` persistence calls fail transiently.
    pub fn fail_transient_next(&self, count: usize) {
        self.transient_remaining.store(count, Ordering::SeqCst);
    }

    fn scripted_failure(&self) -> Option<SourceError> {
        if let Some(reason) = self
            .reject_reason
            .lock()
            .expect("reject_reason lock poisoned")
            .take()
        {
            return Some(SourceError::validation(reason));
        }
        let remaining = self.transient_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_remaining.store(remaining - 1, Ordering::SeqCst);
            return Some(SourceError::transient("injected connection loss"));
        }
        None
    }
}

#[async_trait]
impl ContainerSource for FailingStore {
    async fn fetch_items(&self, key: &ContainerKey) -> SourceResult<Vec<Item>> {
        self.inner.fetch_items(key).await
    }

    async fn persist_move(
        &self,
        id: &ItemId,
        container: &ContainerKey,
        position: f64,
    ) -> SourceResult<Item> {
        if let Some(failure) = self.scripted_failure() {
            return Err(failure);
        }
        self.inner.persist_move(id, container, position).await
    }

    async fn persist_create(
        &self,
        container: &ContainerKey,
        payload: Payload,
        position: f64,
    ) -> SourceResult<Item> {
        if let Some(failure) = self.scripted_failure() {
            return Err(failure);
        }
        self.inner.persist_create(container, payload, position).await
    }

    async fn persist_remove(&self, id: &ItemId) -> SourceResult<Item> {
        if let Some(failure) = self.scripted_failure() {
            return Err(failure);
        }
        self.inner.persist_remove(id).await
    }
}
