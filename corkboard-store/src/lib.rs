//! Reference authoritative side of the corkboard sync engine.
//!
//! [`MemoryStore`] is the canonical [`ContainerSource`] implementation: a
//! single serialized map of items plus a registry of known containers.
//! [`Lookaside`] wraps any source with a short-TTL read-through cache, the
//! server-side counterpart of the participants' container caches.
//!
//! ```rust
//! use corkboard_store::{Lookaside, MemoryStore};
//! use corkboard_sync::{ContainerKey, Item};
//! use corkboard_sync::source::ContainerSource;
//!
//! # async fn example() -> Result<(), corkboard_sync::SourceError> {
//! let store = MemoryStore::new();
//! let inbox = ContainerKey::inbox("u1");
//! store.seed(Item::with_id("a", inbox.clone(), "Follow up", 1000.0)).await;
//!
//! let cached = Lookaside::new(store);
//! let items = cached.fetch_items(&inbox).await?;
//! assert_eq!(items.len(), 1);
//! # Ok(())
//! # }
//! ```

mod lookaside;
mod store;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use lookaside::{Lookaside, DEFAULT_TTL};
pub use store::MemoryStore;

#[cfg(feature = "test-support")]
pub use test_support::FailingStore;
