//! Sinew Sandbox - per-session playground services
//!
//! An LRU cache with TTL, a sliding-window rate limiter and a feature flag
//! evaluator, each scoped to an opaque session id and swept when idle.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod flags;
pub mod models;
pub mod ratelimit;
pub mod sandbox;
pub mod session;
pub mod tasks;

pub use api::AppState;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::Config;
pub use sandbox::Sandbox;
pub use tasks::spawn_cleanup_task;
