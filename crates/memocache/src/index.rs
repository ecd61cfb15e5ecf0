//! Key index shared by every cache policy
//!
//! Maps a key to either the cached value (unbounded, FIFO) or to the
//! [`Handle`](crate::lru::Handle) of its node in the LRU list.

use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

use crate::error::{Error, Result};

/// Hash index with O(1) expected membership, insert and delete
#[derive(Debug)]
pub struct IndexMap<K, V> {
    map: HashMap<K, V, RandomState>,
}

impl<K, V> IndexMap<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            map: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Create an empty index sized for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Check whether `key` is indexed
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up `key`
    ///
    /// Fails with [`Error::KeyNotFound`] if the key is absent; callers treat
    /// absence as a miss by checking [`contains`](Self::contains) first.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.map.get(key).ok_or(Error::KeyNotFound)
    }

    /// Mutable lookup of `key`
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        self.map.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Insert or silently overwrite `key`
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }

    /// Remove `key`, returning what it mapped to
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.map.remove(key).ok_or(Error::KeyNotFound)
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop every key
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterate over indexed keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }
}

impl<K, V> Default for IndexMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}
