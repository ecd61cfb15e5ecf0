//! LRU (Least Recently Used) cache implementation
//!
//! Nodes live in an arena and link to each other by index, so detaching and
//! re-splicing a node is pure index rewiring. Two sentinel slots bracket the
//! list: `HEAD.next` is the most recently used entry, `TAIL.prev` the least.

use std::hash::Hash;
use tracing::debug;

use crate::error::{Error, Result};
use crate::index::IndexMap;

const HEAD: usize = 0;
const TAIL: usize = 1;

/// Stable reference to a node in an [`LruList`]
///
/// Stored by the index; the list remains the sole owner of node storage.
/// A handle goes stale once its entry is evicted or the list is cleared:
/// the slot's generation moves on and the list ignores the old handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: usize,
    generation: u32,
}

/// Node in the LRU doubly-linked list
#[derive(Debug)]
struct Node<K, V> {
    /// `None` for the sentinels and for free slots
    entry: Option<(K, V)>,
    generation: u32,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel() -> Self {
        Self {
            entry: None,
            generation: 0,
            prev: HEAD,
            next: TAIL,
        }
    }
}

/// Recency-ordered doubly-linked list with O(1) bump and eviction
#[derive(Debug)]
pub struct LruList<K, V> {
    nodes: Vec<Node<K, V>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<K, V> LruList<K, V> {
    /// Create an empty list with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 2);
        nodes.push(Node::sentinel());
        nodes.push(Node::sentinel());

        Self {
            nodes,
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Store a new entry at the most-recently-used end
    pub fn record_new(&mut self, key: K, value: V) -> Handle {
        let idx = self.alloc_node(key, value);
        self.attach_front(idx);
        self.len += 1;
        Handle {
            slot: idx,
            generation: self.nodes[idx].generation,
        }
    }

    /// Move the entry behind `handle` to the most-recently-used end
    ///
    /// Returns `false` and leaves the list untouched for a stale handle.
    pub fn bump(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }

        let idx = handle.slot;
        if self.nodes[HEAD].next != idx {
            self.detach(idx);
            self.attach_front(idx);
        }
        true
    }

    /// Detach and return the least recently used entry
    pub fn evict_lru(&mut self) -> Result<(K, V)> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return Err(Error::Empty);
        }

        self.detach(idx);
        let entry = self.release(idx).ok_or(Error::Empty)?;
        self.len -= 1;
        Ok(entry)
    }

    /// Value stored behind `handle`, `None` once the handle is stale
    pub fn value(&self, handle: Handle) -> Option<&V> {
        if !self.is_live(handle) {
            return None;
        }
        self.nodes[handle.slot].entry.as_ref().map(|(_, value)| value)
    }

    /// Mutable value stored behind `handle`, `None` once the handle is stale
    pub fn value_mut(&mut self, handle: Handle) -> Option<&mut V> {
        if !self.is_live(handle) {
            return None;
        }
        self.nodes[handle.slot].entry.as_mut().map(|(_, value)| value)
    }

    /// Check that `handle` still names the entry it was issued for
    pub fn is_live(&self, handle: Handle) -> bool {
        handle.slot > TAIL
            && self
                .nodes
                .get(handle.slot)
                .is_some_and(|node| node.generation == handle.generation && node.entry.is_some())
    }

    /// Number of entries, sentinels excluded
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list holds only its sentinels
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries from most to least recently used
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.nodes[HEAD].next,
        }
    }

    /// Drop every entry, keeping the sentinels
    ///
    /// Slots are kept and retired rather than truncated, so handles issued
    /// before the clear stay stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for idx in (TAIL + 1)..self.nodes.len() {
            self.release(idx);
        }
        self.nodes[HEAD] = Node::sentinel();
        self.nodes[TAIL] = Node::sentinel();
        self.len = 0;
    }

    fn attach_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;

        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn alloc_node(&mut self, key: K, value: V) -> usize {
        if let Some(idx) = self.free_list.pop() {
            let node = &mut self.nodes[idx];
            node.entry = Some((key, value));
            node.prev = HEAD;
            node.next = TAIL;
            idx
        } else {
            self.nodes.push(Node {
                entry: Some((key, value)),
                generation: 0,
                prev: HEAD,
                next: TAIL,
            });
            self.nodes.len() - 1
        }
    }

    /// Empty a slot, retire its generation and put it on the free list
    fn release(&mut self, idx: usize) -> Option<(K, V)> {
        let node = &mut self.nodes[idx];
        let entry = node.entry.take();
        node.generation = node.generation.wrapping_add(1);
        node.prev = HEAD;
        node.next = TAIL;
        self.free_list.push(idx);
        entry
    }
}

/// Iterator over `(handle, key, value)` from most to least recently used
pub struct Iter<'a, K, V> {
    list: &'a LruList<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Handle, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }

        let idx = self.cursor;
        let node = &self.list.nodes[idx];
        self.cursor = node.next;
        let handle = Handle {
            slot: idx,
            generation: node.generation,
        };
        node.entry.as_ref().map(|(key, value)| (handle, key, value))
    }
}

/// LRU cache with fixed capacity
#[derive(Debug)]
pub struct LruCache<K, V> {
    index: IndexMap<K, Handle>,
    list: LruList<K, V>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            index: IndexMap::with_capacity(capacity),
            list: LruList::with_capacity(capacity),
            capacity,
        })
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let handle = *self.index.get(key).ok()?;
        if !self.list.bump(handle) {
            panic!("lru index holds a stale handle");
        }
        self.list.value(handle)
    }

    /// Insert a key-value pair, returning the evicted key if any
    pub fn put(&mut self, key: K, value: V) -> Option<K> {
        if let Ok(&handle) = self.index.get(&key) {
            // Update existing
            match self.list.value_mut(handle) {
                Some(slot) => *slot = value,
                None => panic!("lru index holds a stale handle"),
            }
            self.list.bump(handle);
            return None;
        }

        let handle = self.list.record_new(key.clone(), value);
        self.index.insert(key, handle);

        if self.index.len() > self.capacity {
            let (lru_key, _) = match self.list.evict_lru() {
                Ok(entry) => entry,
                Err(e) => panic!("lru eviction with size {}: {}", self.index.len(), e),
            };
            if self.index.remove(&lru_key).is_err() {
                panic!("lru list held a key missing from the index");
            }
            debug!(capacity = self.capacity, "lru evicted least recently used entry");
            return Some(lru_key);
        }

        None
    }

    /// Check whether `key` is cached without affecting recency
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

    /// Keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|(_, key, _)| key)
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Verify that the list and the index hold the same keys exactly once
    pub fn check_invariants(&self) -> Result<()> {
        if self.list.len() != self.index.len() {
            return Err(Error::Invariant(format!(
                "list length {} != index size {}",
                self.list.len(),
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

        let mut visited = 0;
        let mut prev = HEAD;
        for (handle, key, _) in self.list.iter() {
            if self.list.nodes[handle.slot].prev != prev {
                return Err(Error::Invariant("broken back link".to_string()));
            }
            // A key listed twice cannot map to both handles.
            if self.index.get(key) != Ok(&handle) {
                return Err(Error::Invariant("index and list disagree on a key".to_string()));
            }
            prev = handle.slot;
            visited += 1;
        }

        if self.list.nodes[TAIL].prev != prev {
            return Err(Error::Invariant("tail sentinel out of place".to_string()));
        }
        if visited != self.index.len() {
            return Err(Error::Invariant(format!(
                "walked {} nodes for {} keys",
                visited,
                self.index.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_keys<K: Copy, V>(list: &LruList<K, V>) -> Vec<K> {
        list.iter().map(|(_, key, _)| *key).collect()
    }

    #[test]
    fn test_list_record_and_bump() {
        let mut list = LruList::with_capacity(3);

        let a = list.record_new(1, "a");
        list.record_new(2, "b");
        list.record_new(3, "c");
        assert_eq!(list_keys(&list), vec![3, 2, 1]);

        list.bump(a);
        assert_eq!(list_keys(&list), vec![1, 3, 2]);
    }

    #[test]
    fn test_list_single_entry() {
        let mut list = LruList::with_capacity(1);

        let a = list.record_new(1, "a");
        list.bump(a);
        assert_eq!(list_keys(&list), vec![1]);

        assert_eq!(list.evict_lru(), Ok((1, "a")));
        assert!(list.is_empty());
        assert_eq!(list.evict_lru(), Err(Error::Empty));
    }

    #[test]
    fn test_list_stale_handle_after_evict() {
        let mut list = LruList::with_capacity(1);

        let a = list.record_new(1, "a");
        list.evict_lru().unwrap();
        assert!(!list.is_live(a));
        assert!(!list.bump(a));

        let b = list.record_new(2, "b");
        assert_ne!(a, b);
        assert_eq!(list.len(), 1);
        assert_eq!(list_keys(&list), vec![2]);
        assert_eq!(list.value(a), None);
        assert_eq!(list.value_mut(a), None);
        assert_eq!(list.value(b), Some(&"b"));
    }

    #[test]
    fn test_list_stale_handle_after_clear() {
        let mut list = LruList::with_capacity(2);

        let a = list.record_new(1, "a");
        list.record_new(2, "b");
        list.clear();
        assert!(!list.bump(a));

        list.record_new(3, "c");
        let d = list.record_new(4, "d");
        assert_eq!(list_keys(&list), vec![4, 3]);
        assert_eq!(list.value(a), None);
        assert!(list.bump(d));
    }

    #[test]
    fn test_list_reuses_slots() {
        let mut list = LruList::with_capacity(1);

        list.record_new(1, "a");
        list.evict_lru().unwrap();
        let b = list.record_new(2, "b");

        assert_eq!(list.value(b), Some(&"b"));
        assert_eq!(list.nodes.len(), 3);
    }

    #[test]
    fn test_lru_zero_capacity() {
        assert_eq!(LruCache::<u64, u64>::new(0).unwrap_err(), Error::ZeroCapacity);
    }

    #[test]
    fn test_lru_basic() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.put(3, "c"), Some(1));

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.get(&3), Some(&"c"));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_hit_protects_entry() {
        let mut cache = LruCache::new(3).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        cache.get(&1); // Move 1 to front
        assert_eq!(cache.put(4, "d"), Some(2));

        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec![4, 1, 3]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_overwrite() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.put(1, "z"), None); // Overwrite bumps 1

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.put(3, "c"), Some(2));
        assert_eq!(cache.get(&1), Some(&"z"));
    }

    #[test]
    fn test_lru_clear() {
        let mut cache = LruCache::new(3).unwrap();

        cache.put(1, "a");
        cache.put(2, "b");
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.keys().count(), 0);
        cache.put(3, "c");
        cache.check_invariants().unwrap();
    }
}
