//! Cache Module
//!
//! Per-session in-memory caching with lazy TTL expiration and LRU eviction.

mod entry;
mod lru;
mod service;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CacheEntryView};
pub use lru::LruTracker;
pub use service::CacheService;
pub use stats::{hit_rate, CacheCounters, CacheStats};
pub use store::{CacheLookup, CacheSnapshot, CacheStore, SetOutcome};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 64 * 1024;

/// Default per-session capacity
pub const DEFAULT_MAX_SIZE: usize = 5;
