//! Cache Store Module
//!
//! One session's cache: HashMap storage with LRU tracking and lazy TTL expiry.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheCounters, CacheEntry, CacheEntryView, CacheStats, LruTracker};

// == Results ==
/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheLookup {
    /// The value on a hit, null on a miss
    pub value: Option<Value>,
    pub hit: bool,
}

impl CacheLookup {
    fn hit(value: Value) -> Self {
        Self {
            value: Some(value),
            hit: true,
        }
    }

    fn miss() -> Self {
        Self {
            value: None,
            hit: false,
        }
    }
}

/// Outcome of a cache write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetOutcome {
    /// Key evicted to make room, if any
    pub evicted: Option<String>,
}

/// Entries plus stats, for the playground's cache panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSnapshot {
    pub entries: Vec<CacheEntryView>,
    pub stats: CacheStats,
}

// == Cache Store ==
/// Bounded cache with LRU eviction and TTL support.
///
/// Invariant: `entries.len() <= max_size` after every mutating call returns.
#[derive(Debug, Clone)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    counters: CacheCounters,
    max_size: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store. A `max_size` of 0 is raised to 1.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: CacheCounters::default(),
            max_size: max_size.max(1),
        }
    }

    // == Get ==
    /// Looks up a key.
    ///
    /// Expired entries are removed and reported as misses. A hit moves the key
    /// to the most-recently-used position.
    pub fn get(&mut self, key: &str, now: u64) -> CacheLookup {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.counters.record_miss();
                return CacheLookup::miss();
            }
        };

        if expired {
            self.remove_entry(key);
            self.counters.record_miss();
            debug!(key, "cache entry expired on read");
            return CacheLookup::miss();
        }

        let value = match self.entries.get_mut(key) {
            Some(entry) => {
                entry.touch(now);
                entry.value.clone()
            }
            None => return CacheLookup::miss(),
        };
        self.lru.touch(key);
        self.counters.record_hit();
        CacheLookup::hit(value)
    }

    // == Set ==
    /// Stores a value.
    ///
    /// Re-setting an existing key replaces its value and TTL and makes it most
    /// recently used without evicting anything. A new key at capacity evicts
    /// exactly the least recently used entry.
    pub fn set(&mut self, key: &str, value: Value, ttl: Option<u64>, now: u64) -> SetOutcome {
        let mut evicted = None;

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_size {
            evicted = self.evict_oldest();
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl, now));
        self.lru.touch(key);

        SetOutcome { evicted }
    }

    // == Delete ==
    /// Removes an entry. Returns true if the key was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == Clear ==
    /// Removes every entry and resets the counters.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.counters.reset();
        count
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        CacheStats::new(self.entries.len(), self.max_size, self.counters)
    }

    // == Entries ==
    /// Returns live entries from least to most recently used.
    ///
    /// Expired entries are purged first and never returned.
    pub fn entries(&mut self, now: u64) -> Vec<CacheEntryView> {
        self.cleanup_expired(now);
        self.lru
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| entry.view(key, now)))
            .collect()
    }

    /// Entries plus stats in one read.
    pub fn snapshot(&mut self, now: u64) -> CacheSnapshot {
        let entries = self.entries(now);
        CacheSnapshot {
            entries,
            stats: self.stats(),
        }
    }

    // == Set Max Size ==
    /// Changes the capacity, evicting oldest entries one at a time until the
    /// store fits. A size of 0 is raised to 1.
    ///
    /// Returns the evicted keys in eviction order.
    pub fn set_max_size(&mut self, max_size: usize) -> Vec<String> {
        self.max_size = max_size.max(1);

        let mut evicted = Vec::new();
        while self.entries.len() > self.max_size {
            match self.evict_oldest() {
                Some(key) => evicted.push(key),
                None => break,
            }
        }
        evicted
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self, now: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }
        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.lru.pop_oldest()?;
        self.entries.remove(&key);
        self.counters.record_eviction();
        debug!(key = %key, "evicted least recently used cache entry");
        Some(key)
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }
}
