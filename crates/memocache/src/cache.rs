//! Policy-dispatching cache used by the memoizers

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::fifo::FifoCache;
use crate::index::IndexMap;
use crate::lru::LruCache;

/// Eviction policy of a bounded cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Evict in insertion order; hits do not affect order
    Fifo,
    /// Evict the least recently read or written entry
    Lru,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fifo => write!(f, "fifo"),
            Policy::Lru => write!(f, "lru"),
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(Policy::Fifo),
            "lru" => Ok(Policy::Lru),
            other => Err(format!("unknown policy '{}' (expected fifo or lru)", other)),
        }
    }
}

/// Construction-time settings for a bounded cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries, at least 1
    pub capacity: usize,
    /// Eviction policy
    pub policy: Policy,
}

impl CacheConfig {
    /// Create a config
    pub fn new(capacity: usize, policy: Policy) -> Self {
        Self { capacity, policy }
    }

    /// Reject settings no cache can honor
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            policy: Policy::Lru,
        }
    }
}

/// Cache behind a memoizer, one variant per policy
#[derive(Debug)]
pub enum Cache<K, V> {
    /// Never evicts
    Unbounded(IndexMap<K, V>),
    /// Bounded, insertion-ordered eviction
    Fifo(FifoCache<K, V>),
    /// Bounded, recency-ordered eviction
    Lru(LruCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a bounded cache; fails with `ZeroCapacity` for a capacity of 0
    pub fn new(config: CacheConfig) -> Result<Self> {
        Ok(match config.policy {
            Policy::Fifo => Cache::Fifo(FifoCache::new(config.capacity)?),
            Policy::Lru => Cache::Lru(LruCache::new(config.capacity)?),
        })
    }

    /// Create a cache that grows without bound
    pub fn unbounded() -> Self {
        Cache::Unbounded(IndexMap::new())
    }

    /// Look up `key`; `None` is a miss
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self {
            Cache::Unbounded(index) => index.get(key).ok(),
            Cache::Fifo(cache) => cache.get(key),
            Cache::Lru(cache) => cache.get(key),
        }
    }

    /// Insert or update `key`, returning the evicted key if any
    pub fn put(&mut self, key: K, value: V) -> Option<K> {
        match self {
            Cache::Unbounded(index) => {
                index.insert(key, value);
                None
            }
            Cache::Fifo(cache) => cache.put(key, value),
            Cache::Lru(cache) => cache.put(key, value),
        }
    }

    /// Number of cached entries
    pub fn size(&self) -> usize {
        match self {
            Cache::Unbounded(index) => index.len(),
            Cache::Fifo(cache) => cache.len(),
            Cache::Lru(cache) => cache.len(),
        }
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Check whether `key` is cached, without affecting eviction order
    pub fn contains_key(&self, key: &K) -> bool {
        match self {
            Cache::Unbounded(index) => index.contains(key),
            Cache::Fifo(cache) => cache.contains_key(key),
            Cache::Lru(cache) => cache.contains_key(key),
        }
    }

    /// Maximum number of entries, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Cache::Unbounded(_) => None,
            Cache::Fifo(cache) => Some(cache.capacity()),
            Cache::Lru(cache) => Some(cache.capacity()),
        }
    }

    /// Eviction policy, `None` when unbounded
    pub fn policy(&self) -> Option<Policy> {
        match self {
            Cache::Unbounded(_) => None,
            Cache::Fifo(_) => Some(Policy::Fifo),
            Cache::Lru(_) => Some(Policy::Lru),
        }
    }

    /// Cached keys, next eviction candidate last for LRU and first for FIFO
    pub fn keys(&self) -> Box<dyn Iterator<Item = &K> + '_> {
        match self {
            Cache::Unbounded(index) => Box::new(index.keys()),
            Cache::Fifo(cache) => Box::new(cache.keys()),
            Cache::Lru(cache) => Box::new(cache.keys()),
        }
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        match self {
            Cache::Unbounded(index) => index.clear(),
            Cache::Fifo(cache) => cache.clear(),
            Cache::Lru(cache) => cache.clear(),
        }
    }

    /// Verify index/order consistency and the capacity bound
    pub fn check_invariants(&self) -> Result<()> {
        match self {
            Cache::Unbounded(_) => Ok(()),
            Cache::Fifo(cache) => cache.check_invariants(),
            Cache::Lru(cache) => cache.check_invariants(),
        }
    }
}
