//! Sandbox Module
//!
//! The context object that owns every playground service. Hosts create one and
//! pass it to whatever serves requests; nothing here is a global.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::cache::CacheService;
use crate::clock::{SharedClock, SystemClock};
use crate::config::Config;
use crate::flags::FeatureFlagService;
use crate::ratelimit::RateLimitService;
use crate::session::SessionService;

// == Reports ==
/// What a sweep removed, per store family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub sessions: usize,
    pub cache_stores: usize,
    pub rate_limit_stores: usize,
    pub flag_stores: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.sessions + self.cache_stores + self.rate_limit_stores + self.flag_stores
    }
}

/// Live session counts, per store family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxStats {
    pub active_sessions: usize,
    pub cache_stores: usize,
    pub rate_limit_stores: usize,
    pub flag_stores: usize,
}

// == Sandbox ==
/// The four playground services sharing one clock.
#[derive(Debug)]
pub struct Sandbox {
    pub cache: CacheService,
    pub rate_limit: RateLimitService,
    pub flags: FeatureFlagService,
    pub sessions: SessionService,
    idle_timeout_ms: u64,
}

impl Sandbox {
    /// Creates a sandbox driven by the given clock.
    pub fn new(config: &Config, clock: SharedClock) -> Self {
        let idle_timeout_ms = config.session_idle_timeout_ms();
        Self {
            cache: CacheService::new(clock.clone(), config.cache_max_size),
            rate_limit: RateLimitService::new(
                clock.clone(),
                config.rate_limit,
                config.rate_limit_window_ms,
            ),
            flags: FeatureFlagService::new(clock.clone()),
            sessions: SessionService::new(clock, idle_timeout_ms),
            idle_timeout_ms,
        }
    }

    /// Creates a sandbox on the wall clock.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    // == Destroy Session ==
    /// Removes a session from every store. Returns true if any store had it.
    pub fn destroy_session(&mut self, session_id: &str) -> bool {
        // Non-short-circuiting so every store is cleared
        let removed = [
            self.sessions.destroy(session_id),
            self.cache.destroy(session_id),
            self.rate_limit.destroy(session_id),
            self.flags.destroy(session_id),
        ];
        let existed = removed.iter().any(|r| *r);
        if existed {
            info!(session_id, "session destroyed");
        }
        existed
    }

    // == Sweep Inactive ==
    /// Removes state for sessions idle longer than the idle timeout.
    pub fn sweep_inactive(&mut self) -> SweepReport {
        let report = SweepReport {
            sessions: self.sessions.sweep(),
            cache_stores: self.cache.sweep(self.idle_timeout_ms),
            rate_limit_stores: self.rate_limit.sweep(self.idle_timeout_ms),
            flag_stores: self.flags.sweep(self.idle_timeout_ms),
        };
        if report.total() > 0 {
            info!(
                sessions = report.sessions,
                cache_stores = report.cache_stores,
                rate_limit_stores = report.rate_limit_stores,
                flag_stores = report.flag_stores,
                "swept inactive sandbox sessions"
            );
        }
        report
    }

    /// Purges TTL-expired cache entries in every session.
    pub fn cleanup_expired_entries(&mut self) -> usize {
        self.cache.cleanup_expired()
    }

    pub fn stats(&self) -> SandboxStats {
        SandboxStats {
            active_sessions: self.sessions.active_count(),
            cache_stores: self.cache.session_count(),
            rate_limit_stores: self.rate_limit.session_count(),
            flag_stores: self.flags.session_count(),
        }
    }
}
