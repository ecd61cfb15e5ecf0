//! FIFO (First In First Out) cache
//!
//! A queue of keys records insertion order; reads never reorder it.

use std::collections::VecDeque;
use std::hash::Hash;
use tracing::debug;

use crate::error::{Error, Result};
use crate::index::IndexMap;

/// Insertion-order tracker: append at the tail, evict from the head
#[derive(Debug)]
pub struct FifoTracker<K> {
    queue: VecDeque<K>,
}

impl<K> FifoTracker<K> {
    /// Create an empty tracker
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `key` as the newest entry
    pub fn record(&mut self, key: K) {
        self.queue.push_back(key);
    }

    /// Remove and return the oldest key
    pub fn evict(&mut self) -> Result<K> {
        self.queue.pop_front().ok_or(Error::Empty)
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the tracker is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Keys from oldest to newest
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.queue.iter()
    }

    /// Drop every key
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// FIFO cache with fixed capacity
#[derive(Debug)]
pub struct FifoCache<K, V> {
    index: IndexMap<K, V>,
    order: FifoTracker<K>,
    capacity: usize,
}

impl<K, V> FifoCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new FIFO cache with the given capacity
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            index: IndexMap::with_capacity(capacity),
            order: FifoTracker::with_capacity(capacity),
            capacity,
        })
    }

    /// Get a value from the cache without touching eviction order
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).ok()
    }

    /// Insert a key-value pair, returning the evicted key if any
    ///
    /// Overwriting an existing key keeps its original queue position.
    pub fn put(&mut self, key: K, value: V) -> Option<K> {
        if let Ok(slot) = self.index.get_mut(&key) {
            *slot = value;
            return None;
        }

        self.index.insert(key.clone(), value);
        self.order.record(key);

        if self.index.len() > self.capacity {
            let oldest = match self.order.evict() {
                Ok(key) => key,
                Err(e) => panic!("fifo eviction with size {}: {}", self.index.len(), e),
            };
            if self.index.remove(&oldest).is_err() {
                panic!("fifo queue held a key missing from the index");
            }
            debug!(capacity = self.capacity, "fifo evicted oldest entry");
            return Some(oldest);
        }

        None
    }

    /// Check whether `key` is cached
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains(key)
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get the cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from next-to-evict to newest
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.keys()
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    /// Verify that the queue and the index hold the same keys exactly once
    pub fn check_invariants(&self) -> Result<()> {
        if self.order.len() != self.index.len() {
            return Err(Error::Invariant(format!(
                "queue length {} != index size {}",
                self.order.len(),
                self.index.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(Error::Invariant(format!(
                "size {} > capacity {}",
                self.index.len(),
                self.capacity
            )));
        }

        let mut seen: IndexMap<&K, ()> = IndexMap::with_capacity(self.order.len());
        for key in self.order.keys() {
            if !self.index.contains(key) {
                return Err(Error::Invariant("queued key missing from index".to_string()));
            }
            if seen.contains(&key) {
                return Err(Error::Invariant("key queued twice".to_string()));
            }
            seen.insert(key, ());
        }

        Ok(())
    }
}
