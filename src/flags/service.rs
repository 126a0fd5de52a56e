//! Feature Flag Service Module
//!
//! Per-session flag stores behind a session registry.

use crate::clock::SharedClock;
use crate::flags::{FeatureFlag, FlagCheck, FlagDefinition, FlagEvaluation, FlagStore, FlagsSnapshot};
use crate::session::SessionRegistry;

// == Feature Flag Service ==
/// The playground's flags. New sessions start with the demo flags.
#[derive(Debug)]
pub struct FeatureFlagService {
    stores: SessionRegistry<FlagStore>,
    clock: SharedClock,
}

impl FeatureFlagService {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            stores: SessionRegistry::new(),
            clock,
        }
    }

    fn store(&mut self, session_id: &str) -> (&mut FlagStore, u64) {
        let now = self.clock.now_ms();
        let store = self
            .stores
            .get_or_create(session_id, now, || FlagStore::with_demo_flags(now));
        (store, now)
    }

    pub fn check(&mut self, session_id: &str, flag_key: &str, user_id: Option<&str>) -> FlagCheck {
        let (store, now) = self.store(session_id);
        store.check(flag_key, user_id, now)
    }

    pub fn toggle(&mut self, session_id: &str, flag_key: &str) -> Option<FeatureFlag> {
        let (store, now) = self.store(session_id);
        store.toggle(flag_key, now)
    }

    pub fn set_rollout(&mut self, session_id: &str, flag_key: &str, percentage: i64) -> Option<FeatureFlag> {
        let (store, now) = self.store(session_id);
        store.set_rollout(flag_key, percentage, now)
    }

    pub fn target_user(&mut self, session_id: &str, flag_key: &str, user_id: &str) -> Option<FeatureFlag> {
        let (store, now) = self.store(session_id);
        store.target_user(flag_key, user_id, now)
    }

    pub fn remove_target(&mut self, session_id: &str, flag_key: &str, user_id: &str) -> Option<FeatureFlag> {
        let (store, now) = self.store(session_id);
        store.remove_target(flag_key, user_id, now)
    }

    pub fn create(&mut self, session_id: &str, definition: FlagDefinition) -> Option<FeatureFlag> {
        let (store, now) = self.store(session_id);
        store.create(definition, now)
    }

    pub fn delete(&mut self, session_id: &str, flag_key: &str) -> bool {
        self.store(session_id).0.delete(flag_key)
    }

    pub fn flag(&mut self, session_id: &str, flag_key: &str) -> Option<FeatureFlag> {
        self.store(session_id).0.flag(flag_key).cloned()
    }

    pub fn evaluations(&mut self, session_id: &str) -> Vec<FlagEvaluation> {
        self.store(session_id).0.evaluations()
    }

    pub fn snapshot(&mut self, session_id: &str) -> FlagsSnapshot {
        self.store(session_id).0.snapshot()
    }

    pub fn destroy(&mut self, session_id: &str) -> bool {
        self.stores.destroy(session_id)
    }

    pub fn sweep(&mut self, idle_ms: u64) -> usize {
        let now = self.clock.now_ms();
        self.stores.sweep(now, idle_ms)
    }

    pub fn session_count(&self) -> usize {
        self.stores.len()
    }
}
