//! Memoizer: a computation wrapped with a bounded cache

use std::hash::Hash;
use tracing::{debug, trace};

use crate::cache::{Cache, CacheConfig, Policy};
use crate::error::Result;
use crate::stats::CacheStats;

/// Single-threaded memoizer owning exactly one [`Cache`]
///
/// The computation is assumed pure: on a hit it is not invoked at all.
pub struct Memoizer<K, V, F> {
    /// Wrapped computation
    computation: F,

    /// Results of earlier calls
    cache: Cache<K, V>,

    /// Hit/miss statistics
    stats: CacheStats,
}

impl<K, V, F> Memoizer<K, V, F>
where
    K: Hash + Eq + Clone,
{
    /// Wrap `computation` with a bounded cache
    ///
    /// # Arguments
    /// * `computation` - Function of one key producing one value
    /// * `capacity` - Maximum number of cached results, at least 1
    /// * `policy` - Eviction policy
    ///
    /// # Returns
    /// * `Result<Memoizer>` - Fails with `ZeroCapacity` for a capacity of 0
    pub fn new(computation: F, capacity: usize, policy: Policy) -> Result<Self> {
        Self::with_config(computation, CacheConfig::new(capacity, policy))
    }

    /// Wrap `computation` with a cache built from `config`
    pub fn with_config(computation: F, config: CacheConfig) -> Result<Self> {
        let cache = Cache::new(config)?;
        debug!(capacity = config.capacity, policy = %config.policy, "memoizer created");

        Ok(Self {
            computation,
            cache,
            stats: CacheStats::new(),
        })
    }

    /// Wrap `computation` with a cache that never evicts
    pub fn unbounded(computation: F) -> Self {
        Self {
            computation,
            cache: Cache::unbounded(),
            stats: CacheStats::new(),
        }
    }

    /// Invoke the computation through the cache
    pub fn call(&mut self, key: K) -> V
    where
        F: FnMut(&K) -> V,
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

    /// Invoke a fallible computation through the cache
    ///
    /// An error is returned unchanged and nothing is cached for `key`.
    pub fn try_call<E>(&mut self, key: K) -> std::result::Result<V, E>
    where
        F: FnMut(&K) -> std::result::Result<V, E>,
        V: Clone,
    {
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        match (self.computation)(&key) {
            Ok(value) => {
                self.stats.record_computation(true);
                self.store(key, value.clone());
                Ok(value)
            }
            Err(e) => {
                self.stats.record_computation(false);
                trace!("computation failed, nothing cached");
                Err(e)
            }
        }
    }

    /// Cache for introspection
    pub fn cache(&self) -> &Cache<K, V> {
        &self.cache
    }

    /// Get memoization statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Forget every cached result and reset statistics
    pub fn clear(&mut self) {
        self.cache.clear();
        self.stats.reset();
    }

    fn lookup(&mut self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let hit = self.cache.get(key).cloned();
        self.stats.record_lookup(hit.is_some());
        trace!(hit = hit.is_some(), "memo lookup");
        hit
    }

    fn store(&mut self, key: K, value: V) {
        let inserted = !self.cache.contains_key(&key);
        let evicted = self.cache.put(key, value).is_some();
        self.stats.record_store(inserted, evicted);
    }
}
