//! Cache Entry Module
//!
//! A single cached value with optional TTL and access timestamps.

use serde::Serialize;
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// TTL in milliseconds, None = never expires
    pub ttl: Option<u64>,
    /// Creation timestamp (Unix milliseconds), reset when the key is re-set
    pub created_at: u64,
    /// Last read timestamp (Unix milliseconds)
    pub accessed_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// A TTL of `Some(0)` is stored as `None`: both mean the entry never expires.
    pub fn new(value: Value, ttl: Option<u64>, now: u64) -> Self {
        Self {
            value,
            ttl: ttl.filter(|ms| *ms > 0),
            created_at: now,
            accessed_at: now,
        }
    }

    // == Expires At ==
    /// Returns the expiry timestamp, or None if the entry never expires.
    pub fn expires_at(&self) -> Option<u64> {
        self.ttl.map(|ttl| self.created_at.saturating_add(ttl))
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now >= created_at + ttl`.
    pub fn is_expired(&self, now: u64) -> bool {
        match self.expires_at() {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self, now: u64) -> Option<u64> {
        self.expires_at().map(|expires| expires.saturating_sub(now))
    }

    /// Marks the entry as read at `now`.
    pub fn touch(&mut self, now: u64) {
        self.accessed_at = now;
    }

    /// Builds the visualization view of this entry.
    pub fn view(&self, key: &str, now: u64) -> CacheEntryView {
        CacheEntryView {
            key: key.to_string(),
            value: self.value.clone(),
            ttl: self.ttl,
            created_at: self.created_at,
            accessed_at: self.accessed_at,
            expires_at: self.expires_at(),
            ttl_remaining: self.ttl_remaining_ms(now),
        }
    }
}

// == Cache Entry View ==
/// Serializable snapshot of one entry, as shown by the playground.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntryView {
    pub key: String,
    pub value: Value,
    pub ttl: Option<u64>,
    pub created_at: u64,
    pub accessed_at: u64,
    pub expires_at: Option<u64>,
    pub ttl_remaining: Option<u64>,
}
