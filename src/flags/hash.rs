//! Rollout Hash Module
//!
//! Deterministic bucketing of users into rollout percentiles.

/// Number of rollout buckets; a flag at N% enables buckets `0..N`.
pub const BUCKETS: u32 = 100;

/// 32-bit polynomial rolling hash (`h = h * 31 + c`) over UTF-16 code units.
///
/// Wraps on overflow like a signed 32-bit integer.
pub fn string_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Returns the rollout bucket (`0..100`) for a user and flag pair.
///
/// The same pair always lands in the same bucket.
pub fn rollout_bucket(user_id: &str, flag_key: &str) -> u32 {
    string_hash(&format!("{}:{}", user_id, flag_key)).unsigned_abs() % BUCKETS
}
