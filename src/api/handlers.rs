//! API Handlers
//!
//! Thin glue between HTTP JSON and the sandbox services. Every session-scoped
//! handler records activity for the session before running its operation.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{CacheLookup, CacheSnapshot, CacheStats, SetOutcome};
use crate::clock::SharedClock;
use crate::config::Config;
use crate::error::{Result, SandboxError};
use crate::flags::{FeatureFlag, FlagCheck, FlagsSnapshot};
use crate::models::{
    validate_identifier, CheckFlagQuery, ClearResponse, CreateFlagRequest, DeleteResponse,
    HealthResponse, LimitRequest, MaxSizeRequest, MaxSizeResponse, RolloutRequest, SetRequest,
    WindowRequest,
};
use crate::ratelimit::RateLimitResult;
use crate::sandbox::{Sandbox, SandboxStats, SweepReport};
use crate::session::SessionInfo;

/// Application state shared across all handlers.
///
/// The sandbox sits behind one lock so each request's operation runs to
/// completion before the next starts.
#[derive(Clone)]
pub struct AppState {
    pub sandbox: Arc<RwLock<Sandbox>>,
}

impl AppState {
    pub fn new(sandbox: Sandbox) -> Self {
        Self {
            sandbox: Arc::new(RwLock::new(sandbox)),
        }
    }

    /// Creates state on the wall clock from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Sandbox::from_config(config))
    }

    /// Creates state driven by an explicit clock.
    pub fn with_clock(config: &Config, clock: SharedClock) -> Self {
        Self::new(Sandbox::new(config, clock))
    }
}

fn check_identifier(label: &str, value: &str) -> Result<()> {
    match validate_identifier(label, value) {
        Some(message) => Err(SandboxError::InvalidRequest(message)),
        None => Ok(()),
    }
}

/// Acquires the sandbox and records activity for the session.
async fn session_scope<'a>(
    state: &'a AppState,
    session_id: &str,
) -> Result<tokio::sync::RwLockWriteGuard<'a, Sandbox>> {
    check_identifier("Session id", session_id)?;
    let mut sandbox = state.sandbox.write().await;
    sandbox.sessions.touch(session_id);
    Ok(sandbox)
}

// == Service Endpoints ==

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<SandboxStats> {
    let sandbox = state.sandbox.read().await;
    Json(sandbox.stats())
}

/// Handler for POST /maintenance/sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<SweepReport> {
    let mut sandbox = state.sandbox.write().await;
    Json(sandbox.sweep_inactive())
}

// == Sessions ==

/// Handler for GET /sessions/:sid
///
/// Read-only: does not count as session activity.
pub async fn session_info_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>> {
    check_identifier("Session id", &session_id)?;
    let sandbox = state.sandbox.read().await;
    sandbox
        .sessions
        .info(&session_id)
        .map(Json)
        .ok_or(SandboxError::SessionNotFound(session_id))
}

/// Handler for DELETE /sessions/:sid
pub async fn destroy_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    check_identifier("Session id", &session_id)?;
    let mut sandbox = state.sandbox.write().await;
    Ok(Json(DeleteResponse {
        deleted: sandbox.destroy_session(&session_id),
    }))
}

// == Cache ==

/// Handler for GET /sessions/:sid/cache
pub async fn cache_snapshot_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CacheSnapshot>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(sandbox.cache.snapshot(&session_id)))
}

/// Handler for PUT /sessions/:sid/cache
pub async fn cache_set_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetOutcome>> {
    if let Some(error_msg) = req.validate() {
        return Err(SandboxError::InvalidRequest(error_msg));
    }

    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(sandbox.cache.set(&session_id, &req.key, req.value, req.ttl)))
}

/// Handler for DELETE /sessions/:sid/cache
pub async fn cache_clear_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ClearResponse>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(ClearResponse {
        removed: sandbox.cache.clear(&session_id),
    }))
}

/// Handler for GET /sessions/:sid/cache/entries/:key
///
/// A miss is a normal response with `hit: false`.
pub async fn cache_get_handler(
    State(state): State<AppState>,
    Path((session_id, key)): Path<(String, String)>,
) -> Result<Json<CacheLookup>> {
    check_identifier("Key", &key)?;
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(sandbox.cache.get(&session_id, &key)))
}

/// Handler for DELETE /sessions/:sid/cache/entries/:key
pub async fn cache_delete_handler(
    State(state): State<AppState>,
    Path((session_id, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    check_identifier("Key", &key)?;
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(DeleteResponse {
        deleted: sandbox.cache.delete(&session_id, &key),
    }))
}

/// Handler for GET /sessions/:sid/cache/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CacheStats>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(sandbox.cache.stats(&session_id)))
}

/// Handler for PUT /sessions/:sid/cache/max-size
pub async fn cache_max_size_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<MaxSizeRequest>,
) -> Result<Json<MaxSizeResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(SandboxError::InvalidRequest(error_msg));
    }

    let mut sandbox = session_scope(&state, &session_id).await?;
    let evicted = sandbox.cache.set_max_size(&session_id, req.max_size);
    Ok(Json(MaxSizeResponse {
        max_size: req.max_size,
        evicted,
    }))
}

// == Rate Limit ==

/// Handler for GET /sessions/:sid/rate-limit
pub async fn rate_limit_status_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RateLimitResult>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(sandbox.rate_limit.status(&session_id)))
}

/// Handler for POST /sessions/:sid/rate-limit/check
///
/// A blocked request is a normal response with `blocked: true`.
pub async fn rate_limit_check_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RateLimitResult>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(sandbox.rate_limit.check(&session_id)))
}

/// Handler for DELETE /sessions/:sid/rate-limit
pub async fn rate_limit_reset_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RateLimitResult>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox.rate_limit.reset(&session_id);
    Ok(Json(sandbox.rate_limit.status(&session_id)))
}

/// Handler for PUT /sessions/:sid/rate-limit/limit
pub async fn rate_limit_set_limit_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<LimitRequest>,
) -> Result<Json<RateLimitResult>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox.rate_limit.set_limit(&session_id, req.limit);
    Ok(Json(sandbox.rate_limit.status(&session_id)))
}

/// Handler for PUT /sessions/:sid/rate-limit/window
pub async fn rate_limit_set_window_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<WindowRequest>,
) -> Result<Json<RateLimitResult>> {
    if let Some(error_msg) = req.validate() {
        return Err(SandboxError::InvalidRequest(error_msg));
    }

    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox.rate_limit.set_window(&session_id, req.window_ms);
    Ok(Json(sandbox.rate_limit.status(&session_id)))
}

// == Feature Flags ==

/// Handler for GET /sessions/:sid/flags
pub async fn flags_snapshot_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<FlagsSnapshot>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(sandbox.flags.snapshot(&session_id)))
}

/// Handler for POST /sessions/:sid/flags
pub async fn flag_create_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<CreateFlagRequest>,
) -> Result<Json<FeatureFlag>> {
    check_identifier("Flag key", &req.key)?;
    let mut sandbox = session_scope(&state, &session_id).await?;
    let key = req.key.clone();
    sandbox
        .flags
        .create(&session_id, req)
        .map(Json)
        .ok_or(SandboxError::FlagExists(key))
}

/// Handler for GET /sessions/:sid/flags/:key
pub async fn flag_get_handler(
    State(state): State<AppState>,
    Path((session_id, flag_key)): Path<(String, String)>,
) -> Result<Json<FeatureFlag>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox
        .flags
        .flag(&session_id, &flag_key)
        .map(Json)
        .ok_or(SandboxError::FlagNotFound(flag_key))
}

/// Handler for DELETE /sessions/:sid/flags/:key
pub async fn flag_delete_handler(
    State(state): State<AppState>,
    Path((session_id, flag_key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    Ok(Json(DeleteResponse {
        deleted: sandbox.flags.delete(&session_id, &flag_key),
    }))
}

/// Handler for GET /sessions/:sid/flags/:key/check?userId=
///
/// An unknown flag is a normal response with `flag: null`.
pub async fn flag_check_handler(
    State(state): State<AppState>,
    Path((session_id, flag_key)): Path<(String, String)>,
    Query(query): Query<CheckFlagQuery>,
) -> Result<Json<FlagCheck>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    let user_id = query.user_id.as_deref().filter(|u| !u.is_empty());
    Ok(Json(sandbox.flags.check(&session_id, &flag_key, user_id)))
}

/// Handler for POST /sessions/:sid/flags/:key/toggle
pub async fn flag_toggle_handler(
    State(state): State<AppState>,
    Path((session_id, flag_key)): Path<(String, String)>,
) -> Result<Json<FeatureFlag>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox
        .flags
        .toggle(&session_id, &flag_key)
        .map(Json)
        .ok_or(SandboxError::FlagNotFound(flag_key))
}

/// Handler for PUT /sessions/:sid/flags/:key/rollout
pub async fn flag_rollout_handler(
    State(state): State<AppState>,
    Path((session_id, flag_key)): Path<(String, String)>,
    Json(req): Json<RolloutRequest>,
) -> Result<Json<FeatureFlag>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox
        .flags
        .set_rollout(&session_id, &flag_key, req.percentage)
        .map(Json)
        .ok_or(SandboxError::FlagNotFound(flag_key))
}

/// Handler for PUT /sessions/:sid/flags/:key/targets/:user
pub async fn flag_target_handler(
    State(state): State<AppState>,
    Path((session_id, flag_key, user_id)): Path<(String, String, String)>,
) -> Result<Json<FeatureFlag>> {
    check_identifier("User id", &user_id)?;
    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox
        .flags
        .target_user(&session_id, &flag_key, &user_id)
        .map(Json)
        .ok_or(SandboxError::FlagNotFound(flag_key))
}

/// Handler for DELETE /sessions/:sid/flags/:key/targets/:user
pub async fn flag_untarget_handler(
    State(state): State<AppState>,
    Path((session_id, flag_key, user_id)): Path<(String, String, String)>,
) -> Result<Json<FeatureFlag>> {
    let mut sandbox = session_scope(&state, &session_id).await?;
    sandbox
        .flags
        .remove_target(&session_id, &flag_key, &user_id)
        .map(Json)
        .ok_or(SandboxError::FlagNotFound(flag_key))
}
