//! Ordered-collection synchronization engine for corkboard boards.
//!
//! Boards hold ordered lists, lists hold ordered cards, and many
//! participants (browser tabs, users, automation agents) reorder them
//! concurrently. This crate is the machinery that keeps every observer's
//! view eventually consistent without full-collection rewrites: sparse
//! floating-point positions, per-participant container caches with an
//! idempotent merge, optimistic dispatch with revert-on-failure, and a
//! board-scoped event relay.
//!
//! ## Overview
//!
//! - **[`position`]** — pure position allocation: midpoints between
//!   neighbors, gap-based appends, renumbering when resolution runs out
//! - **[`cache`]** — each participant's per-container snapshots; the same
//!   idempotent merge absorbs optimistic patches and relayed events
//! - **[`drag`]** — the pointer-gesture state machine and edge auto-scroll;
//!   synchronous, preview-only until the drop commits
//! - **[`dispatch`]** — two-phase mutations: optimistic patch, authoritative
//!   request, confirm or revert-to-snapshot
//! - **[`relay`]** — board-scoped broadcast of container mutations
//! - **[`source`]** — the seam to the authoritative store
//!
//! ## Basic usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use corkboard_sync::{CacheStore, ContainerKey, EventRelay, MutationDispatcher, Payload};
//! use corkboard_sync::position::{Anchor, Edge};
//! use corkboard_store::MemoryStore;
//!
//! # async fn example() -> Result<(), corkboard_sync::SyncError> {
//! let source = Arc::new(MemoryStore::new());
//! let relay = Arc::new(EventRelay::new());
//! let cache = Arc::new(CacheStore::new());
//! let dispatcher = MutationDispatcher::new(cache.clone(), source.clone(), relay.clone());
//!
//! let todo = ContainerKey::list_cards("board", "todo");
//! source.register_container(todo.clone()).await;
//!
//! let card = dispatcher
//!     .create(&todo, Payload::titled("Write the report"), Anchor::End, Edge::After)
//!     .await?;
//!
//! // The acting participant's cache already reflects the change; other
//! // participants receive it through the relay.
//! let doing = ContainerKey::list_cards("board", "doing");
//! source.register_container(doing.clone()).await;
//! dispatcher.commit(&card.id, &todo, &doing, Anchor::End, Edge::After).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod dispatch;
pub mod drag;
mod error;
pub mod position;
pub mod relay;
pub mod source;
pub mod types;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use cache::{CachePatch, CacheStore, ContainerCache};
pub use dispatch::MutationDispatcher;
pub use drag::{DragSession, DragState, DropCommit};
pub use error::{Result, SourceError, SyncError};
pub use relay::{EventRelay, Subscription};
pub use source::ContainerSource;
pub use types::{
    BoardId, ChannelKey, ContainerKey, EventKind, Item, ItemEvent, ItemId, Payload, UserId,
};
