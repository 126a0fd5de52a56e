//! Rate Limit Module
//!
//! Sliding-window request limiting, one window per session.

mod service;
mod window;

pub use service::RateLimitService;
pub use window::{RateLimitRecord, RateLimitResult, RateLimitWindow};

/// Default allowed requests per window
pub const DEFAULT_LIMIT: u32 = 5;

/// Default window length in milliseconds
pub const DEFAULT_WINDOW_MS: u64 = 10_000;

/// Records returned to callers per result; the window itself is not capped
pub const MAX_DISPLAYED_REQUESTS: usize = 20;
