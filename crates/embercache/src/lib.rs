//! # embercache
//!
//! Fixed-capacity in-memory LRU cache.
//!
//! ## Architecture
//! - **Index**: AHash-keyed `HashMap` from key to arena slot (O(1) lookups)
//! - **Recency list**: doubly linked list threaded through an arena of
//!   slots, bracketed by two permanent sentinels (O(1) promotion/eviction)
//! - **Shared front**: [`EmberCache`] wraps the core [`LruCache`] in a
//!   `parking_lot` lock with hit/miss statistics
//!
//! The core [`LruCache`] is single-threaded; every mutating operation keeps
//! the index and the recency list in lockstep. [`EmberCache`] is the
//! cloneable handle for use across threads.

#![warn(missing_docs)]

mod cache;
mod error;
mod lru;
mod stats;

pub use cache::EmberCache;
pub use error::{Error, Result};
pub use lru::LruCache;
pub use stats::{CacheStats, StatsSnapshot};
