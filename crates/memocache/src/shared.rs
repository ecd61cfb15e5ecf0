//! Memoizer shareable across threads
//!
//! The whole cache (index and order tracker together) sits behind one lock.
//! The lock is taken for the lookup and again for the store; the computation
//! itself runs unlocked, so two threads missing on the same key may both
//! compute it, and the second store is an update that neither grows the cache
//! nor evicts.

use std::hash::Hash;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{Cache, CacheConfig, Policy};
use crate::error::Result;
use crate::stats::CacheStats;

/// Thread-safe memoizer over a `Fn` computation
pub struct SharedMemoizer<K, V, F> {
    computation: F,
    cache: Mutex<Cache<K, V>>,
    stats: CacheStats,
}

impl<K, V, F> SharedMemoizer<K, V, F>
where
    K: Hash + Eq + Clone,
{
    /// Wrap `computation` with a bounded, lock-protected cache
    pub fn new(computation: F, capacity: usize, policy: Policy) -> Result<Self> {
        let config = CacheConfig::new(capacity, policy);
        let cache = Cache::new(config)?;
        debug!(capacity, policy = %policy, "shared memoizer created");

        Ok(Self {
            computation,
            cache: Mutex::new(cache),
            stats: CacheStats::new(),
        })
    }

    /// Invoke the computation through the cache
    pub fn call(&self, key: K) -> V
    where
        F: Fn(&K) -> V,
        V: Clone,
    {
        if let Some(value) = self.lookup(&key) {
            return value;
        }

        let value = (self.computation)(&key);
        self.stats.record_computation(true);
        self.store(key, value.clone());
        value
    }

    /// Invoke a fallible computation; errors are returned and never cached
    pub fn try_call<E>(&self, key: K) -> std::result::Result<V, E>
    where
        F: Fn(&K) -> std::result::Result<V, E>,
        V: Clone,
    {
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        let result = (self.computation)(&key);
        self.stats.record_computation(result.is_ok());
        let value = result?;
        self.store(key, value.clone());
        Ok(value)
    }

    /// Number of cached results
    pub fn size(&self) -> usize {
        self.cache.lock().size()
    }

    /// Check whether `key` is cached
    pub fn contains_key(&self, key: &K) -> bool {
        self.cache.lock().contains_key(key)
    }

    /// Get memoization statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Verify index/order consistency under the lock
    pub fn check_invariants(&self) -> Result<()> {
        self.cache.lock().check_invariants()
    }

    fn lookup(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let hit = self.cache.lock().get(key).cloned();
        self.stats.record_lookup(hit.is_some());
        hit
    }

    fn store(&self, key: K, value: V) {
        let (inserted, evicted) = {
            let mut cache = self.cache.lock();
            let inserted = !cache.contains_key(&key);
            (inserted, cache.put(key, value).is_some())
        };
        self.stats.record_store(inserted, evicted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_shared_basic() {
        let memo = SharedMemoizer::new(|x: &u64| x * x, 2, Policy::Lru).unwrap();

        assert_eq!(memo.call(3), 9);
        assert_eq!(memo.call(3), 9);
        assert_eq!(memo.stats().hits(), 1);
        assert_eq!(memo.size(), 1);
    }

    #[test]
    fn test_shared_concurrent_callers() {
        let computations = AtomicU64::new(0);
        let memo = SharedMemoizer::new(
            |x: &u64| {
                computations.fetch_add(1, Ordering::Relaxed);
                x + 100
            },
            8,
            Policy::Fifo,
        )
        .unwrap();

        thread::scope(|s| {
            for t in 0..4u64 {
                let memo = &memo;
                s.spawn(move || {
                    for i in 0..200u64 {
                        let key = (i * 7 + t) % 16;
                        assert_eq!(memo.call(key), key + 100);
                    }
                });
            }
        });

        assert!(memo.size() <= 8);
        memo.check_invariants().unwrap();

        let stats = memo.stats().snapshot();
        assert_eq!(stats.hits + stats.misses, 800);
        assert_eq!(stats.computations, computations.load(Ordering::Relaxed));
        assert_eq!(stats.computations, stats.misses);
        assert!(stats.computations >= 16);
        // A duplicate computation of a cached key stores as an update
        assert!(stats.inserts <= stats.computations);
        assert_eq!(stats.inserts - stats.evictions, memo.size() as u64);
    }

    #[test]
    fn test_shared_duplicate_computation_inserts_once() {
        // Both callers are inside the computation before either stores
        let barrier = Barrier::new(2);
        let memo = SharedMemoizer::new(
            |x: &u64| {
                barrier.wait();
                x * 2
            },
            4,
            Policy::Lru,
        )
        .unwrap();

        thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| assert_eq!(memo.call(21), 42));
            }
        });

        let stats = memo.stats().snapshot();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.computations, 2);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(memo.size(), 1);
        memo.check_invariants().unwrap();
    }

    #[test]
    fn test_shared_failure_not_cached() {
        let memo = SharedMemoizer::new(
            |x: &u64| if *x == 0 { Err("zero") } else { Ok(10 / x) },
            4,
            Policy::Lru,
        )
        .unwrap();

        assert_eq!(memo.try_call(0), Err("zero"));
        assert!(!memo.contains_key(&0));
        assert_eq!(memo.try_call(5), Ok(2));
        assert_eq!(memo.stats().failures(), 1);
        assert_eq!(memo.stats().computations(), 2);
        assert_eq!(memo.stats().inserts(), 1);
    }
}
