//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::DEFAULT_MAX_SIZE;
use crate::ratelimit::{DEFAULT_LIMIT, DEFAULT_WINDOW_MS};
use crate::session::DEFAULT_IDLE_TIMEOUT_MS;

/// Server and sandbox configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Per-session cache capacity
    pub cache_max_size: usize,
    /// Allowed requests per rate limit window
    pub rate_limit: u32,
    /// Rate limit window length in milliseconds
    pub rate_limit_window_ms: u64,
    /// Seconds of inactivity before a session's state is swept
    pub session_idle_timeout: u64,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_MAX_SIZE` - Per-session cache capacity (default: 5)
    /// - `RATE_LIMIT` - Requests per window (default: 5)
    /// - `RATE_LIMIT_WINDOW_MS` - Window length in ms (default: 10000)
    /// - `SESSION_IDLE_TIMEOUT` - Idle seconds before sweep (default: 3600)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_max_size: env_or("CACHE_MAX_SIZE", defaults.cache_max_size),
            rate_limit: env_or("RATE_LIMIT", defaults.rate_limit),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
            session_idle_timeout: env_or("SESSION_IDLE_TIMEOUT", defaults.session_idle_timeout),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }

    /// Session idle timeout in milliseconds.
    pub fn session_idle_timeout_ms(&self) -> u64 {
        self.session_idle_timeout.saturating_mul(1000)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_max_size: DEFAULT_MAX_SIZE,
            rate_limit: DEFAULT_LIMIT,
            rate_limit_window_ms: DEFAULT_WINDOW_MS,
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT_MS / 1000,
            cleanup_interval: 60,
        }
    }
}

/// Parses an env var, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
