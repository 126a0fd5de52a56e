//! API Module
//!
//! HTTP handlers and routing for the sandbox REST API.
//!
//! # Endpoints
//! - `GET /health`, `GET /stats`, `POST /maintenance/sweep`
//! - `/sessions/:sid` - session info and teardown
//! - `/sessions/:sid/cache/...` - LRU cache
//! - `/sessions/:sid/rate-limit/...` - sliding-window rate limiter
//! - `/sessions/:sid/flags/...` - feature flags

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
