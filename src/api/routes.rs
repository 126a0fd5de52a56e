//! API Routes
//!
//! Configures the Axum router with all sandbox endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::*;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin so the playground can call from the docs site
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/maintenance/sweep", post(sweep_handler))
        .route(
            "/sessions/:sid",
            get(session_info_handler).delete(destroy_session_handler),
        )
        .merge(cache_routes())
        .merge(rate_limit_routes())
        .merge(flag_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cache_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions/:sid/cache",
            get(cache_snapshot_handler)
                .put(cache_set_handler)
                .delete(cache_clear_handler),
        )
        .route(
            "/sessions/:sid/cache/entries/:key",
            get(cache_get_handler).delete(cache_delete_handler),
        )
        .route("/sessions/:sid/cache/stats", get(cache_stats_handler))
        .route("/sessions/:sid/cache/max-size", put(cache_max_size_handler))
}

fn rate_limit_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions/:sid/rate-limit",
            get(rate_limit_status_handler).delete(rate_limit_reset_handler),
        )
        .route(
            "/sessions/:sid/rate-limit/check",
            post(rate_limit_check_handler),
        )
        .route(
            "/sessions/:sid/rate-limit/limit",
            put(rate_limit_set_limit_handler),
        )
        .route(
            "/sessions/:sid/rate-limit/window",
            put(rate_limit_set_window_handler),
        )
}

fn flag_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions/:sid/flags",
            get(flags_snapshot_handler).post(flag_create_handler),
        )
        .route(
            "/sessions/:sid/flags/:key",
            get(flag_get_handler).delete(flag_delete_handler),
        )
        .route("/sessions/:sid/flags/:key/check", get(flag_check_handler))
        .route("/sessions/:sid/flags/:key/toggle", post(flag_toggle_handler))
        .route("/sessions/:sid/flags/:key/rollout", put(flag_rollout_handler))
        .route(
            "/sessions/:sid/flags/:key/targets/:user",
            put(flag_target_handler).delete(flag_untarget_handler),
        )
}
