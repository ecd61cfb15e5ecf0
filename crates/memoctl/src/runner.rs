//! Drives a memoized `square` over a sequence of inputs

use std::cell::Cell;

use anyhow::Result;
use memocache::{CacheConfig, Memoizer, Policy};
use tracing::info;

/// Outcome of one memoized call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub input: u64,
    pub output: u64,
    pub computed: bool,
}

/// Results of a run plus the final cache state
#[derive(Debug)]
pub struct RunReport {
    pub calls: Vec<CallRecord>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
    pub cached_keys: Vec<u64>,
}

/// The demonstration computation
pub fn square(x: &u64) -> u64 {
    x.wrapping_mul(*x)
}

/// Memoize `square` under `config` and call it once per input
pub fn run(config: CacheConfig, inputs: &[u64]) -> Result<RunReport> {
    let computed = Cell::new(false);
    let mut memo = Memoizer::with_config(
        |x: &u64| {
            computed.set(true);
            square(x)
        },
        config,
    )?;

    let mut calls = Vec::with_capacity(inputs.len());
    for &input in inputs {
        computed.set(false);
        let output = memo.call(input);
        calls.push(CallRecord {
            input,
            output,
            computed: computed.get(),
        });
    }

    let stats = memo.stats();
    Ok(RunReport {
        calls,
        hits: stats.hits(),
        misses: stats.misses(),
        evictions: stats.evictions(),
        hit_ratio: stats.hit_ratio(),
        cached_keys: memo.cache().keys().copied().collect(),
    })
}

/// Canonical eviction scenarios: (title, policy, inputs), capacity 3
pub fn scenarios() -> Vec<(&'static str, Policy, Vec<u64>)> {
    vec![
        ("FIFO: hit on 1 does not save it from eviction", Policy::Fifo, vec![1, 2, 3, 1, 4, 1]),
        ("LRU: hit on 1 evicts 2 instead", Policy::Lru, vec![1, 2, 3, 1, 4, 2, 1]),
    ]
}

/// Print a report the way `memoctl` shows it
pub fn print_report(config: &CacheConfig, report: &RunReport) {
    println!("policy={} capacity={}", config.policy, config.capacity);
    for call in &report.calls {
        let how = if call.computed { "computed" } else { "cached" };
        println!("  f({}) = {:<12} [{}]", call.input, call.output, how);
    }
    println!("  cached keys: {:?}", report.cached_keys);
    info!(
        hits = report.hits,
        misses = report.misses,
        evictions = report.evictions,
        "hit ratio {:.2}",
        report.hit_ratio
    );
}
