//! Rate Limit Service Module
//!
//! Per-session sliding windows behind a session registry.

use crate::clock::SharedClock;
use crate::ratelimit::{RateLimitResult, RateLimitWindow};
use crate::session::SessionRegistry;

// == Rate Limit Service ==
#[derive(Debug)]
pub struct RateLimitService {
    windows: SessionRegistry<RateLimitWindow>,
    clock: SharedClock,
    default_limit: u32,
    default_window_ms: u64,
}

impl RateLimitService {
    pub fn new(clock: SharedClock, default_limit: u32, default_window_ms: u64) -> Self {
        Self {
            windows: SessionRegistry::new(),
            clock,
            default_limit,
            default_window_ms,
        }
    }

    fn window(&mut self, session_id: &str) -> (&mut RateLimitWindow, u64) {
        let now = self.clock.now_ms();
        let (limit, window_ms) = (self.default_limit, self.default_window_ms);
        let window = self
            .windows
            .get_or_create(session_id, now, || RateLimitWindow::new(limit, window_ms));
        (window, now)
    }

    /// Records a request attempt for the session.
    pub fn check(&mut self, session_id: &str) -> RateLimitResult {
        let (window, now) = self.window(session_id);
        window.check(now)
    }

    /// Reads the session's limiter state without consuming a slot.
    pub fn status(&mut self, session_id: &str) -> RateLimitResult {
        let (window, now) = self.window(session_id);
        window.status(now)
    }

    pub fn reset(&mut self, session_id: &str) {
        self.window(session_id).0.reset();
    }

    pub fn set_limit(&mut self, session_id: &str, limit: u32) {
        self.window(session_id).0.set_limit(limit);
    }

    pub fn set_window(&mut self, session_id: &str, window_ms: u64) {
        self.window(session_id).0.set_window(window_ms);
    }

    pub fn destroy(&mut self, session_id: &str) -> bool {
        self.windows.destroy(session_id)
    }

    pub fn sweep(&mut self, idle_ms: u64) -> usize {
        let now = self.clock.now_ms();
        self.windows.sweep(now, idle_ms)
    }

    pub fn session_count(&self) -> usize {
        self.windows.len()
    }
}
