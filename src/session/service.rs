//! Session Service Module
//!
//! Tracks which playground sessions are alive and how active they are.

use serde::Serialize;

use crate::clock::SharedClock;
use crate::session::SessionRegistry;

// == Session Info ==
/// Public view of a tracked session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: u64,
    pub last_active_at: u64,
    /// When the session becomes eligible for sweeping if left idle
    pub expires_at: u64,
    pub request_count: u64,
}

#[derive(Debug, Clone, Default)]
struct SessionActivity {
    request_count: u64,
}

// == Session Service ==
#[derive(Debug)]
pub struct SessionService {
    sessions: SessionRegistry<SessionActivity>,
    clock: SharedClock,
    idle_timeout_ms: u64,
}

impl SessionService {
    pub fn new(clock: SharedClock, idle_timeout_ms: u64) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            clock,
            idle_timeout_ms,
        }
    }

    // == Touch ==
    /// Records activity for a session, starting to track it if new.
    pub fn touch(&mut self, session_id: &str) -> SessionInfo {
        let now = self.clock.now_ms();
        self.sessions
            .get_or_create(session_id, now, SessionActivity::default)
            .request_count += 1;
        self.describe(session_id).unwrap_or_else(|| SessionInfo {
            session_id: session_id.to_string(),
            created_at: now,
            last_active_at: now,
            expires_at: now.saturating_add(self.idle_timeout_ms),
            request_count: 1,
        })
    }

    /// Returns session details without counting as activity.
    pub fn info(&self, session_id: &str) -> Option<SessionInfo> {
        self.describe(session_id)
    }

    pub fn destroy(&mut self, session_id: &str) -> bool {
        self.sessions.destroy(session_id)
    }

    /// Forgets sessions idle for longer than the idle timeout.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.sessions.sweep(now, self.idle_timeout_ms)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn idle_timeout_ms(&self) -> u64 {
        self.idle_timeout_ms
    }

    fn describe(&self, session_id: &str) -> Option<SessionInfo> {
        self.sessions.slot(session_id).map(|slot| SessionInfo {
            session_id: session_id.to_string(),
            created_at: slot.created_at,
            last_active_at: slot.last_active_at,
            expires_at: slot.last_active_at.saturating_add(self.idle_timeout_ms),
            request_count: slot.state.request_count,
        })
    }
}
