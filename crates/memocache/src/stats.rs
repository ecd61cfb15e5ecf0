//! Memoization statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing how a memoizer has served its calls
///
/// `misses` counts lookups that found nothing; `computations` counts
/// invocations of the wrapped function; `inserts` counts results that
/// became new entries. Under [`SharedMemoizer`](crate::SharedMemoizer) two
/// threads missing on the same key both compute, but only one inserts.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
    failures: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Calls served from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Invocations of the wrapped computation
    pub computations: u64,
    /// Computations that returned an error
    pub failures: u64,
    /// Results stored under a key not cached before
    pub inserts: u64,
    /// Entries dropped to make room
    pub evictions: u64,
}

impl StatsSnapshot {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_lookup(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_computation(&self, succeeded: bool) {
        self.computations.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_store(&self, inserted: bool, evicted: bool) {
        if inserted {
            self.inserts.fetch_add(1, Ordering::Relaxed);
        }
        if evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get total invocations of the computation, failed ones included
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    /// Get total failed computations
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Get total new entries
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Get total evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        self.snapshot().hit_ratio()
    }

    /// Copy every counter at once
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            computations: self.computations(),
            failures: self.failures(),
            inserts: self.inserts(),
            evictions: self.evictions(),
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.computations,
            &self.failures,
            &self.inserts,
            &self.evictions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_lookups() {
        let stats = CacheStats::new();

        stats.record_lookup(true);
        stats.record_lookup(true);
        stats.record_lookup(false);

        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.hit_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_stats_computations_and_stores() {
        let stats = CacheStats::new();

        stats.record_computation(true);
        stats.record_computation(false);
        stats.record_store(true, false);
        stats.record_store(false, false); // update of an existing key
        stats.record_store(true, true);

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                hits: 0,
                misses: 0,
                computations: 2,
                failures: 1,
                inserts: 2,
                evictions: 1,
            }
        );
    }

    #[test]
    fn test_stats_reset() {
        let stats = CacheStats::new();

        stats.record_lookup(true);
        stats.record_computation(false);
        stats.record_store(true, true);
        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.hit_ratio(), 0.0);
    }
}
