//! Flag Store Module
//!
//! One session's flags and its evaluation log.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::flags::{
    clamp_percentage, demo_flags, rollout_bucket, EvaluationReason, FeatureFlag, FlagCheck,
    FlagDefinition, FlagEvaluation, ANONYMOUS_USER, MAX_EVALUATIONS,
};

/// Flags and recent evaluations, for the playground's flag panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagsSnapshot {
    pub flags: Vec<FeatureFlag>,
    /// Newest first
    pub evaluations: Vec<FlagEvaluation>,
}

// == Flag Store ==
#[derive(Debug, Clone, Default)]
pub struct FlagStore {
    flags: BTreeMap<String, FeatureFlag>,
    evaluations: VecDeque<FlagEvaluation>,
}

impl FlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the demo flags.
    pub fn with_demo_flags(now: u64) -> Self {
        let mut store = Self::new();
        for definition in demo_flags() {
            store.create(definition, now);
        }
        store
    }

    // == Check ==
    /// Evaluates a flag for a user.
    ///
    /// First match wins: unknown flag, disabled, targeted user, rollout bucket,
    /// default. Every outcome except an unknown flag is logged.
    pub fn check(&mut self, flag_key: &str, user_id: Option<&str>, now: u64) -> FlagCheck {
        let flag = match self.flags.get(flag_key) {
            Some(flag) => flag.clone(),
            None => {
                return FlagCheck {
                    enabled: false,
                    reason: EvaluationReason::Default,
                    flag: None,
                }
            }
        };

        let user_id = user_id.unwrap_or(ANONYMOUS_USER);
        let (enabled, reason) = if !flag.enabled {
            (false, EvaluationReason::Disabled)
        } else if flag.is_targeted(user_id) {
            (true, EvaluationReason::Targeted)
        } else if rollout_bucket(user_id, flag_key) < u32::from(flag.rollout_percentage) {
            (true, EvaluationReason::Rollout)
        } else {
            (false, EvaluationReason::Default)
        };

        self.log(FlagEvaluation {
            user_id: user_id.to_string(),
            flag_key: flag_key.to_string(),
            enabled,
            reason,
            timestamp: now,
        });

        FlagCheck {
            enabled,
            reason,
            flag: Some(flag),
        }
    }

    // == Mutations ==
    /// Flips a flag on or off.
    pub fn toggle(&mut self, flag_key: &str, now: u64) -> Option<FeatureFlag> {
        self.update(flag_key, now, |flag| flag.enabled = !flag.enabled)
    }

    /// Sets the rollout percentage, clamped to `0..=100`.
    pub fn set_rollout(&mut self, flag_key: &str, percentage: i64, now: u64) -> Option<FeatureFlag> {
        self.update(flag_key, now, |flag| {
            flag.rollout_percentage = clamp_percentage(percentage)
        })
    }

    /// Adds a user to the flag's targets. Adding twice is a no-op.
    pub fn target_user(&mut self, flag_key: &str, user_id: &str, now: u64) -> Option<FeatureFlag> {
        self.update(flag_key, now, |flag| {
            flag.targeted_users.insert(user_id.to_string());
        })
    }

    /// Removes a user from the flag's targets. Removing an absent user is a no-op.
    pub fn remove_target(&mut self, flag_key: &str, user_id: &str, now: u64) -> Option<FeatureFlag> {
        self.update(flag_key, now, |flag| {
            flag.targeted_users.remove(user_id);
        })
    }

    /// Adds a new flag. Returns None if the key is already taken.
    pub fn create(&mut self, definition: FlagDefinition, now: u64) -> Option<FeatureFlag> {
        if self.flags.contains_key(&definition.key) {
            return None;
        }
        let flag = FeatureFlag::from_definition(definition, now);
        self.flags.insert(flag.key.clone(), flag.clone());
        Some(flag)
    }

    pub fn delete(&mut self, flag_key: &str) -> bool {
        self.flags.remove(flag_key).is_some()
    }

    // == Reads ==
    pub fn flag(&self, flag_key: &str) -> Option<&FeatureFlag> {
        self.flags.get(flag_key)
    }

    pub fn flags(&self) -> Vec<FeatureFlag> {
        self.flags.values().cloned().collect()
    }

    /// Evaluation log, newest first.
    pub fn evaluations(&self) -> Vec<FlagEvaluation> {
        self.evaluations.iter().cloned().collect()
    }

    pub fn snapshot(&self) -> FlagsSnapshot {
        FlagsSnapshot {
            flags: self.flags(),
            evaluations: self.evaluations(),
        }
    }

    fn update<F>(&mut self, flag_key: &str, now: u64, mutate: F) -> Option<FeatureFlag>
    where
        F: FnOnce(&mut FeatureFlag),
    {
        let flag = self.flags.get_mut(flag_key)?;
        mutate(flag);
        flag.updated_at = now;
        Some(flag.clone())
    }

    fn log(&mut self, evaluation: FlagEvaluation) {
        self.evaluations.push_front(evaluation);
        self.evaluations.truncate(MAX_EVALUATIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(definition: FlagDefinition) -> FlagStore {
        let mut store = FlagStore::new();
        store.create(definition, 0);
        store
    }

    /// Finds a user id whose bucket for `flag_key` satisfies `predicate`.
    fn user_in_bucket(flag_key: &str, predicate: impl Fn(u32) -> bool) -> String {
        (0..10_000)
            .map(|i| format!("user{}", i))
            .find(|user| predicate(rollout_bucket(user, flag_key)))
            .unwrap()
    }

    #[test]
    fn test_unknown_flag_is_default_and_unlogged() {
        let mut store = FlagStore::new();
        let check = store.check("missing", Some("u"), 0);

        assert!(!check.enabled);
        assert_eq!(check.reason, EvaluationReason::Default);
        assert!(check.flag.is_none());
        assert!(store.evaluations().is_empty());
    }

    #[test]
    fn test_disabled_flag() {
        let mut store = store_with(FlagDefinition::new("f").rollout(100).target("u"));
        let check = store.check("f", Some("u"), 0);

        assert!(!check.enabled);
        assert_eq!(check.reason, EvaluationReason::Disabled);
        assert_eq!(store.evaluations().len(), 1);
    }

    #[test]
    fn test_targeting_beats_zero_rollout() {
        let mut store = store_with(FlagDefinition::new("f").enabled(true).rollout(0).target("vip"));
        let check = store.check("f", Some("vip"), 0);

        assert!(check.enabled);
        assert_eq!(check.reason, EvaluationReason::Targeted);
    }

    #[test]
    fn test_rollout_enables_low_buckets() {
        let mut store = store_with(FlagDefinition::new("f").enabled(true).rollout(50));
        let inside = user_in_bucket("f", |b| b < 50);
        let outside = user_in_bucket("f", |b| b >= 50);

        let check = store.check("f", Some(&inside), 0);
        assert!(check.enabled);
        assert_eq!(check.reason, EvaluationReason::Rollout);

        let check = store.check("f", Some(&outside), 0);
        assert!(!check.enabled);
        assert_eq!(check.reason, EvaluationReason::Default);
    }

    #[test]
    fn test_full_and_zero_rollout() {
        let mut store = store_with(FlagDefinition::new("f").enabled(true).rollout(100));
        assert!(store.check("f", Some("anyone"), 0).enabled);

        store.set_rollout("f", 0, 1);
        assert!(!store.check("f", Some("anyone"), 1).enabled);
    }

    #[test]
    fn test_rollout_is_deterministic() {
        let mut store = store_with(FlagDefinition::new("flag").enabled(true).rollout(50));
        let first = store.check("flag", Some("user1"), 0);
        let second = store.check("flag", Some("user1"), 1);

        assert_eq!(first.enabled, second.enabled);
        assert_eq!(first.reason, second.reason);
    }

    #[test]
    fn test_missing_user_is_anonymous() {
        let mut store = store_with(FlagDefinition::new("f").enabled(true));
        store.check("f", None, 0);

        assert_eq!(store.evaluations()[0].user_id, ANONYMOUS_USER);
    }

    #[test]
    fn test_evaluation_log_cap() {
        let mut store = store_with(FlagDefinition::new("f").enabled(true).rollout(100));
        for i in 0..60u64 {
            store.check("f", Some(&format!("user{}", i)), i);
        }

        let log = store.evaluations();
        assert_eq!(log.len(), MAX_EVALUATIONS);
        assert_eq!(log.first().unwrap().timestamp, 59);
        assert_eq!(log.last().unwrap().timestamp, 10);
    }

    #[test]
    fn test_toggle_updates_timestamp_without_logging() {
        let mut store = store_with(FlagDefinition::new("f"));

        let flag = store.toggle("f", 42).unwrap();
        assert!(flag.enabled);
        assert_eq!(flag.updated_at, 42);
        assert_eq!(flag.created_at, 0);
        assert!(store.evaluations().is_empty());

        assert!(!store.toggle("f", 43).unwrap().enabled);
    }

    #[test]
    fn test_set_rollout_clamps() {
        let mut store = store_with(FlagDefinition::new("f"));

        assert_eq!(store.set_rollout("f", 150, 1).unwrap().rollout_percentage, 100);
        assert_eq!(store.set_rollout("f", -3, 2).unwrap().rollout_percentage, 0);
    }

    #[test]
    fn test_targeting_is_idempotent() {
        let mut store = store_with(FlagDefinition::new("f"));

        store.target_user("f", "u", 1);
        let flag = store.target_user("f", "u", 2).unwrap();
        assert_eq!(flag.targeted_users.len(), 1);
        assert_eq!(flag.updated_at, 2);

        store.remove_target("f", "u", 3);
        let flag = store.remove_target("f", "u", 4).unwrap();
        assert!(flag.targeted_users.is_empty());
        assert_eq!(flag.updated_at, 4);
    }

    #[test]
    fn test_mutations_on_unknown_flag() {
        let mut store = FlagStore::new();

        assert!(store.toggle("x", 0).is_none());
        assert!(store.set_rollout("x", 10, 0).is_none());
        assert!(store.target_user("x", "u", 0).is_none());
        assert!(store.remove_target("x", "u", 0).is_none());
    }

    #[test]
    fn test_create_and_delete() {
        let mut store = FlagStore::new();

        assert!(store.create(FlagDefinition::new("f"), 0).is_some());
        assert!(store.create(FlagDefinition::new("f"), 1).is_none());
        assert!(store.delete("f"));
        assert!(!store.delete("f"));
        assert!(store.flag("f").is_none());
    }

    #[test]
    fn test_demo_flags_seeded() {
        let mut store = FlagStore::with_demo_flags(0);

        assert_eq!(store.flags().len(), 3);
        assert!(store.check("dark-mode", Some("anyone"), 0).enabled);

        let beta = store.check("beta-dashboard", Some("beta-tester"), 0);
        assert_eq!(beta.reason, EvaluationReason::Disabled);
    }

    #[test]
    fn test_snapshot() {
        let mut store = store_with(FlagDefinition::new("f").enabled(true));
        store.check("f", Some("u"), 5);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.flags.len(), 1);
        assert_eq!(snapshot.evaluations.len(), 1);
        assert_eq!(snapshot.evaluations[0].flag_key, "f");
    }
}
