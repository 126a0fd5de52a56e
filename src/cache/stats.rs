//! Cache Statistics Module
//!
//! Hit/miss/eviction counters for one session's cache.

use serde::Serialize;

// == Counters ==
/// Running counters kept by a session cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Cache Stats ==
/// Cache statistics as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,
    /// Capacity before eviction kicks in
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// hits / (hits + misses), 0 with no accesses
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn new(size: usize, max_size: usize, counters: CacheCounters) -> Self {
        Self {
            size,
            max_size,
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            hit_rate: hit_rate(counters.hits, counters.misses),
        }
    }
}

// == Hit Rate ==
/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
