//! # memocache
//!
//! Bounded memoization of pure single-argument computations.
//!
//! ## Architecture
//! - **IndexMap**: AHash table from key to value or list handle (O(1))
//! - **FIFO**: Queue of keys in insertion order, evicted from the front (O(1))
//! - **LRU**: Arena-backed doubly-linked list with sentinels (O(1) bump/evict)
//! - **Memoizer**: Computation + one cache; computes on miss, never on hit
//!
//! `Memoizer` is single-threaded. `SharedMemoizer` puts the whole cache
//! behind a single `parking_lot` mutex for concurrent callers.

#![warn(missing_docs)]

mod cache;
mod error;
mod fifo;
mod index;
mod lru;
mod memo;
mod shared;
mod stats;

pub use cache::{Cache, CacheConfig, Policy};
pub use error::{Error, Result};
pub use fifo::{FifoCache, FifoTracker};
pub use index::IndexMap;
pub use lru::{Handle, Iter, LruCache, LruList};
pub use memo::Memoizer;
pub use shared::SharedMemoizer;
pub use stats::{CacheStats, StatsSnapshot};
