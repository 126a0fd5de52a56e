//! Cache Service Module
//!
//! Per-session cache stores behind a session registry.

use serde_json::Value;

use crate::cache::{CacheEntryView, CacheLookup, CacheSnapshot, CacheStats, CacheStore, SetOutcome};
use crate::clock::SharedClock;
use crate::session::SessionRegistry;

// == Cache Service ==
/// The playground's cache: one bounded LRU store per session.
#[derive(Debug)]
pub struct CacheService {
    stores: SessionRegistry<CacheStore>,
    clock: SharedClock,
    default_max_size: usize,
}

impl CacheService {
    /// Creates a service whose new sessions start with `default_max_size`.
    pub fn new(clock: SharedClock, default_max_size: usize) -> Self {
        Self {
            stores: SessionRegistry::new(),
            clock,
            default_max_size,
        }
    }

    fn store(&mut self, session_id: &str) -> (&mut CacheStore, u64) {
        let now = self.clock.now_ms();
        let max_size = self.default_max_size;
        let store = self
            .stores
            .get_or_create(session_id, now, || CacheStore::new(max_size));
        (store, now)
    }

    pub fn get(&mut self, session_id: &str, key: &str) -> CacheLookup {
        let (store, now) = self.store(session_id);
        store.get(key, now)
    }

    /// Stores a value. `ttl` is in milliseconds; `None` or `Some(0)` never expires.
    pub fn set(&mut self, session_id: &str, key: &str, value: Value, ttl: Option<u64>) -> SetOutcome {
        let (store, now) = self.store(session_id);
        store.set(key, value, ttl, now)
    }

    pub fn delete(&mut self, session_id: &str, key: &str) -> bool {
        self.store(session_id).0.delete(key)
    }

    pub fn clear(&mut self, session_id: &str) -> usize {
        self.store(session_id).0.clear()
    }

    pub fn stats(&mut self, session_id: &str) -> CacheStats {
        self.store(session_id).0.stats()
    }

    pub fn entries(&mut self, session_id: &str) -> Vec<CacheEntryView> {
        let (store, now) = self.store(session_id);
        store.entries(now)
    }

    pub fn snapshot(&mut self, session_id: &str) -> CacheSnapshot {
        let (store, now) = self.store(session_id);
        store.snapshot(now)
    }

    /// Returns the keys evicted to fit the new size.
    pub fn set_max_size(&mut self, session_id: &str, max_size: usize) -> Vec<String> {
        self.store(session_id).0.set_max_size(max_size)
    }

    // == Maintenance ==
    /// Drops expired entries in every session without touching activity.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.stores
            .states_mut()
            .map(|store| store.cleanup_expired(now))
            .sum()
    }

    pub fn destroy(&mut self, session_id: &str) -> bool {
        self.stores.destroy(session_id)
    }

    pub fn sweep(&mut self, idle_ms: u64) -> usize {
        let now = self.clock.now_ms();
        self.stores.sweep(now, idle_ms)
    }

    pub fn session_count(&self) -> usize {
        self.stores.len()
    }
}
