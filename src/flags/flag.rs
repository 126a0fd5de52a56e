//! Feature Flag Module
//!
//! Flag definitions and the evaluation log entries they produce.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// == Feature Flag ==
/// A flag with on/off state, percentage rollout and per-user targeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlag {
    pub key: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    /// Share of users enabled by hashing, 0..=100
    pub rollout_percentage: u8,
    pub targeted_users: BTreeSet<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl FeatureFlag {
    /// Builds a flag from a definition, clamping the rollout percentage.
    pub fn from_definition(definition: FlagDefinition, now: u64) -> Self {
        Self {
            name: definition.name.unwrap_or_else(|| definition.key.clone()),
            key: definition.key,
            description: definition.description.unwrap_or_default(),
            enabled: definition.enabled,
            rollout_percentage: clamp_percentage(definition.rollout_percentage),
            targeted_users: definition.targeted_users.into_iter().collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_targeted(&self, user_id: &str) -> bool {
        self.targeted_users.contains(user_id)
    }
}

// == Flag Definition ==
/// Input for creating a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDefinition {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub rollout_percentage: i64,
    #[serde(default)]
    pub targeted_users: Vec<String>,
}

impl FlagDefinition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn rollout(mut self, percentage: i64) -> Self {
        self.rollout_percentage = percentage;
        self
    }

    pub fn target(mut self, user_id: &str) -> Self {
        self.targeted_users.push(user_id.to_string());
        self
    }
}

/// Clamps a requested percentage into `0..=100`.
pub fn clamp_percentage(percentage: i64) -> u8 {
    percentage.clamp(0, 100) as u8
}

// == Evaluation ==
/// Why a flag evaluated the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationReason {
    Targeted,
    Rollout,
    Disabled,
    Default,
}

/// Immutable log entry for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagEvaluation {
    pub user_id: String,
    pub flag_key: String,
    pub enabled: bool,
    pub reason: EvaluationReason,
    pub timestamp: u64,
}

/// Result of evaluating a flag for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagCheck {
    pub enabled: bool,
    pub reason: EvaluationReason,
    /// The evaluated flag, null when it does not exist
    pub flag: Option<FeatureFlag>,
}

// == Demo Flags ==
/// Flags every new session starts with.
pub fn demo_flags() -> Vec<FlagDefinition> {
    vec![
        FlagDefinition::new("new-checkout")
            .named("New Checkout", "Redesigned checkout flow")
            .enabled(true)
            .rollout(50),
        FlagDefinition::new("dark-mode")
            .named("Dark Mode", "Dark color scheme")
            .enabled(true)
            .rollout(100),
        FlagDefinition::new("beta-dashboard")
            .named("Beta Dashboard", "Early access analytics dashboard")
            .target("beta-tester"),
    ]
}
