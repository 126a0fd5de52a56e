//! Feature Flags Module
//!
//! Flag evaluation with targeting and deterministic percentage rollout.

mod flag;
mod hash;
mod service;
mod store;


pub use flag::{
    clamp_percentage, demo_flags, EvaluationReason, FeatureFlag, FlagCheck, FlagDefinition,
    FlagEvaluation,
};
pub use hash::{rollout_bucket, string_hash, BUCKETS};
pub use service::FeatureFlagService;
pub use store::{FlagStore, FlagsSnapshot};

/// Evaluation log length kept per session
pub const MAX_EVALUATIONS: usize = 50;

/// User id recorded when a check names no user
pub const ANONYMOUS_USER: &str = "anonymous";
