//! Sliding Window Module
//!
//! Counts allowed requests inside a trailing time window.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::ratelimit::MAX_DISPLAYED_REQUESTS;

// == Records ==
/// One request attempt, allowed or blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitRecord {
    pub timestamp: u64,
    pub allowed: bool,
}

/// State of the limiter after a check or status read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub limit: u32,
    /// Allowed requests left in the current window
    pub remaining: u32,
    /// Timestamp at which the oldest allowed request leaves the window
    pub reset: u64,
    pub blocked: bool,
    /// Most recent records, newest last, capped for display
    pub requests: Vec<RateLimitRecord>,
}

// == Rate Limit Window ==
/// Sliding-window limiter for one session.
///
/// Blocked attempts are recorded for display but never count toward the limit.
#[derive(Debug, Clone)]
pub struct RateLimitWindow {
    requests: VecDeque<RateLimitRecord>,
    limit: u32,
    window_ms: u64,
}

impl RateLimitWindow {
    pub fn new(limit: u32, window_ms: u64) -> Self {
        Self {
            requests: VecDeque::new(),
            limit,
            window_ms,
        }
    }

    // == Check ==
    /// Records a request attempt and reports whether it was allowed.
    pub fn check(&mut self, now: u64) -> RateLimitResult {
        self.purge(now);

        let used = self.allowed_count();
        let blocked = used >= self.limit;
        self.requests.push_back(RateLimitRecord {
            timestamp: now,
            allowed: !blocked,
        });

        let remaining = if blocked {
            0
        } else {
            self.limit - (used + 1)
        };
        if blocked {
            debug!(limit = self.limit, "rate limit exceeded");
        }

        self.result(now, remaining, blocked)
    }

    // == Status ==
    /// Reports the current state without recording a request.
    pub fn status(&mut self, now: u64) -> RateLimitResult {
        self.purge(now);

        let used = self.allowed_count();
        let blocked = used >= self.limit;
        self.result(now, self.limit.saturating_sub(used), blocked)
    }

    // == Reset ==
    /// Forgets every recorded request.
    pub fn reset(&mut self) {
        self.requests.clear();
    }

    /// Changes the limit for future checks only.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    /// Changes the window length for future checks only.
    pub fn set_window(&mut self, window_ms: u64) {
        self.window_ms = window_ms;
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Number of records currently held, including blocked attempts.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Drops records older than `now - window_ms`.
    fn purge(&mut self, now: u64) {
        let window_start = now.saturating_sub(self.window_ms);
        while let Some(front) = self.requests.front() {
            if front.timestamp < window_start {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }

    fn allowed_count(&self) -> u32 {
        self.requests.iter().filter(|r| r.allowed).count() as u32
    }

    fn result(&self, now: u64, remaining: u32, blocked: bool) -> RateLimitResult {
        let reset = self
            .requests
            .iter()
            .find(|r| r.allowed)
            .map(|r| r.timestamp)
            .unwrap_or(now)
            .saturating_add(self.window_ms);

        let skip = self.requests.len().saturating_sub(MAX_DISPLAYED_REQUESTS);
        RateLimitResult {
            limit: self.limit,
            remaining,
            reset,
            blocked,
            requests: self.requests.iter().skip(skip).copied().collect(),
        }
    }
}
