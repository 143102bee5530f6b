//! Error types for the synchronization engine

use crate::types::{ContainerKey, ItemId};
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Failure classification reported by a container data source.
///
/// The mutation dispatcher uses this classification to decide between
/// retrying and reverting; everything except `Transient` is final.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The item or container does not exist on the authoritative side
    #[error("not found: {id}")]
    NotFound { id: String },

    /// The acting participant may not mutate this container
    #[error("access denied: {reason}")]
    AccessDenied { reason: String },

    /// The data source rejected the write (domain validation)
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Timeout, connection loss, or other maybe-it-worked failure
    #[error("transient failure: {message}")]
    Transient { message: String },
}

impl SourceError {
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound {
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Whether a retry of the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Errors surfaced by the engine.
///
/// Expected conditions (cache miss, anchor not found) are not errors; only
/// the mutation dispatcher and the fetch path produce these.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching a container's items from the data source failed
    #[error("fetch failed for {key}: {source}")]
    Fetch {
        key: ContainerKey,
        source: SourceError,
    },

    /// The item being moved is not present in any local cache
    #[error("unknown item: {id}")]
    UnknownItem { id: ItemId },

    /// The data source rejected the mutation; optimistic patches were reverted
    #[error("persistence rejected: {source}")]
    PersistenceRejected { source: SourceError },

    /// The mutation failed transiently even after retry; patches were reverted
    #[error("persistence failed transiently: {source}")]
    PersistenceTransient { source: SourceError },

    /// The relay channel was closed underneath a subscriber
    #[error("relay channel closed")]
    RelayClosed,

    /// A slow subscriber missed events; the container should be re-fetched
    #[error("relay lagged, {skipped} events dropped")]
    RelayLagged { skipped: u64 },
}

impl SyncError {
    /// Whether retrying the whole operation could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PersistenceTransient { .. } | Self::RelayLagged { .. }
        )
    }
}
