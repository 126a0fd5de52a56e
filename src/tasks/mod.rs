//! Background Tasks Module
//!
//! Tasks that run periodically during server operation.
//!
//! # Tasks
//! - Session cleanup: drops idle sessions and expired cache entries

mod cleanup;

pub use cleanup::spawn_cleanup_task;
