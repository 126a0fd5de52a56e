//! Response DTOs for the sandbox API
//!
//! Most endpoints return the store result types directly; these cover the rest.

use serde::Serialize;

/// Response body for deletes
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Response body for DELETE /sessions/:sid/cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// Response body for PUT /sessions/:sid/cache/max-size
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSizeResponse {
    pub max_size: usize,
    /// Keys evicted to fit, oldest first
    pub evicted: Vec<String>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
