//! Session Module
//!
//! Session-scoped state ownership and activity tracking.

mod registry;
mod service;

pub use registry::{SessionRegistry, SessionSlot};
pub use service::{SessionInfo, SessionService};

/// Sessions untouched for this long are swept (1 hour)
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 60 * 60 * 1000;
