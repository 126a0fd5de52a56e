//! Request DTOs for the sandbox API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::flags::FlagDefinition;

/// Request body for a cache write (PUT /sessions/:sid/cache)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    /// Any JSON value
    pub value: Value,
    /// Optional TTL in milliseconds; omitted or 0 never expires
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_identifier("Key", &self.key) {
            return Some(error);
        }
        let size = serde_json::to_vec(&self.value).map(|v| v.len()).unwrap_or(0);
        if size > MAX_VALUE_SIZE {
            return Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            ));
        }
        None
    }
}

/// Request body for PUT /sessions/:sid/cache/max-size
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSizeRequest {
    pub max_size: usize,
}

impl MaxSizeRequest {
    pub fn validate(&self) -> Option<String> {
        (self.max_size == 0).then(|| "maxSize must be at least 1".to_string())
    }
}

/// Request body for PUT /sessions/:sid/rate-limit/limit
#[derive(Debug, Clone, Deserialize)]
pub struct LimitRequest {
    pub limit: u32,
}

/// Request body for PUT /sessions/:sid/rate-limit/window
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRequest {
    pub window_ms: u64,
}

impl WindowRequest {
    pub fn validate(&self) -> Option<String> {
        (self.window_ms == 0).then(|| "windowMs must be positive".to_string())
    }
}

/// Request body for PUT /sessions/:sid/flags/:key/rollout
///
/// Out-of-range percentages are clamped, not rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct RolloutRequest {
    pub percentage: i64,
}

/// Query string for GET /sessions/:sid/flags/:key/check
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFlagQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Request body for POST /sessions/:sid/flags
pub type CreateFlagRequest = FlagDefinition;

/// Validates a session id, cache key, flag key or user id.
pub fn validate_identifier(label: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        return Some(format!("{} cannot be empty", label));
    }
    if value.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "{} exceeds maximum length of {} bytes",
            label, MAX_KEY_LENGTH
        ));
    }
    None
}
