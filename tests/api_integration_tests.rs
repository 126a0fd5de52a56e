//! Integration Tests for API Endpoints
//!
//! Full request/response cycles against the router, with a manual clock
//! standing in for elapsed time.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sinew_sandbox::{api::create_router, AppState, Config, ManualClock};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Router, Arc<ManualClock>) {
    create_test_app_with(Config::default())
}

fn create_test_app_with(config: Config) -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let state = AppState::with_clock(&config, clock.clone());
    (create_router(state), clock)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// == Cache Endpoint Tests ==

#[tokio::test]
async fn test_cache_set_and_get() {
    let (app, _) = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/sessions/s1/cache",
        Some(r#"{"key":"user:1","value":{"name":"Ada","roles":["admin"]}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["evicted"].is_null());

    let (status, json) = send(&app, "GET", "/sessions/s1/cache/entries/user:1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hit"], true);
    assert_eq!(json["value"]["name"], "Ada");
    assert_eq!(json["value"]["roles"][0], "admin");
}

#[tokio::test]
async fn test_cache_miss_is_sentinel_not_error() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/sessions/s1/cache/entries/absent", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hit"], false);
    assert!(json["value"].is_null());
}

#[tokio::test]
async fn test_cache_eviction_with_max_size_one() {
    let (app, _) = create_test_app_with(Config {
        cache_max_size: 1,
        ..Config::default()
    });

    send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"a","value":1}"#)).await;
    let (_, json) = send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"b","value":2}"#)).await;
    assert_eq!(json["evicted"], "a");

    let (_, json) = send(&app, "GET", "/sessions/s1/cache/entries/a", None).await;
    assert_eq!(json["hit"], false);
}

#[tokio::test]
async fn test_cache_ttl_expiry() {
    let (app, clock) = create_test_app();

    send(
        &app,
        "PUT",
        "/sessions/s1/cache",
        Some(r#"{"key":"k","value":"v","ttl":100}"#),
    )
    .await;

    clock.advance(150);

    let (_, json) = send(&app, "GET", "/sessions/s1/cache/entries/k", None).await;
    assert_eq!(json["hit"], false);

    let (_, json) = send(&app, "GET", "/sessions/s1/cache", None).await;
    assert_eq!(json["entries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_cache_stats_and_clear() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"k","value":1}"#)).await;
    send(&app, "GET", "/sessions/s1/cache/entries/k", None).await;
    send(&app, "GET", "/sessions/s1/cache/entries/k", None).await;
    send(&app, "GET", "/sessions/s1/cache/entries/x", None).await;

    let (status, json) = send(&app, "GET", "/sessions/s1/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["size"], 1);
    assert_eq!(json["maxSize"], 5);
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    assert!((json["hitRate"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);

    let (_, json) = send(&app, "DELETE", "/sessions/s1/cache", None).await;
    assert_eq!(json["removed"], 1);

    let (_, json) = send(&app, "GET", "/sessions/s1/cache/stats", None).await;
    assert_eq!(json["hits"], 0);
    assert_eq!(json["hitRate"], 0.0);
}

#[tokio::test]
async fn test_cache_delete() {
    let (app, _) = create_test_app();
    send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"k","value":1}"#)).await;

    let (_, json) = send(&app, "DELETE", "/sessions/s1/cache/entries/k", None).await;
    assert_eq!(json["deleted"], true);

    let (_, json) = send(&app, "DELETE", "/sessions/s1/cache/entries/k", None).await;
    assert_eq!(json["deleted"], false);
}

#[tokio::test]
async fn test_cache_shrink_max_size() {
    let (app, _) = create_test_app();
    for key in ["a", "b", "c", "d"] {
        let body = format!(r#"{{"key":"{}","value":0}}"#, key);
        send(&app, "PUT", "/sessions/s1/cache", Some(&body)).await;
    }

    let (status, json) = send(
        &app,
        "PUT",
        "/sessions/s1/cache/max-size",
        Some(r#"{"maxSize":2}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["evicted"], serde_json::json!(["a", "b"]));

    let (_, json) = send(&app, "GET", "/sessions/s1/cache", None).await;
    let keys: Vec<&str> = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["c", "d"]);
}

#[tokio::test]
async fn test_cache_sessions_are_isolated() {
    let (app, _) = create_test_app();
    send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"k","value":1}"#)).await;

    let (_, json) = send(&app, "GET", "/sessions/s2/cache/entries/k", None).await;
    assert_eq!(json["hit"], false);
}

// == Rate Limit Endpoint Tests ==

#[tokio::test]
async fn test_rate_limit_window() {
    let (app, clock) = create_test_app();

    for i in 0..5 {
        let (status, json) = send(&app, "POST", "/sessions/s1/rate-limit/check", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["blocked"], false, "request {} should pass", i + 1);
        assert_eq!(json["remaining"], 4 - i);
        clock.advance(100);
    }

    let (status, json) = send(&app, "POST", "/sessions/s1/rate-limit/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["blocked"], true);
    assert_eq!(json["remaining"], 0);
    assert_eq!(json["requests"].as_array().unwrap().len(), 6);

    clock.advance(10_001);

    let (_, json) = send(&app, "POST", "/sessions/s1/rate-limit/check", None).await;
    assert_eq!(json["blocked"], false);
}

#[tokio::test]
async fn test_rate_limit_status_does_not_consume() {
    let (app, _) = create_test_app();
    send(&app, "POST", "/sessions/s1/rate-limit/check", None).await;

    for _ in 0..3 {
        let (_, json) = send(&app, "GET", "/sessions/s1/rate-limit", None).await;
        assert_eq!(json["remaining"], 4);
        assert_eq!(json["requests"].as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_rate_limit_settings_and_reset() {
    let (app, _) = create_test_app();

    let (_, json) = send(&app, "PUT", "/sessions/s1/rate-limit/limit", Some(r#"{"limit":1}"#)).await;
    assert_eq!(json["limit"], 1);

    send(&app, "POST", "/sessions/s1/rate-limit/check", None).await;
    let (_, json) = send(&app, "POST", "/sessions/s1/rate-limit/check", None).await;
    assert_eq!(json["blocked"], true);

    let (_, json) = send(&app, "DELETE", "/sessions/s1/rate-limit", None).await;
    assert_eq!(json["remaining"], 1);
    assert_eq!(json["requests"].as_array().unwrap().len(), 0);

    let (status, _) = send(
        &app,
        "PUT",
        "/sessions/s1/rate-limit/window",
        Some(r#"{"windowMs":0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == Feature Flag Endpoint Tests ==

#[tokio::test]
async fn test_flags_snapshot_has_demo_flags() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/sessions/s1/flags", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["flags"].as_array().unwrap().len(), 3);
    assert_eq!(json["evaluations"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_flag_check_is_deterministic() {
    let (app, _) = create_test_app();
    let uri = "/sessions/s1/flags/new-checkout/check?userId=user1";

    let (_, first) = send(&app, "GET", uri, None).await;
    let (_, second) = send(&app, "GET", uri, None).await;

    assert_eq!(first["enabled"], second["enabled"]);
    assert_eq!(first["reason"], second["reason"]);
    assert_eq!(first["flag"]["key"], "new-checkout");
}

#[tokio::test]
async fn test_flag_targeting_beats_zero_rollout() {
    let (app, _) = create_test_app();

    let (_, json) = send(
        &app,
        "PUT",
        "/sessions/s1/flags/new-checkout/rollout",
        Some(r#"{"percentage":-20}"#),
    )
    .await;
    assert_eq!(json["rolloutPercentage"], 0);

    let (status, json) = send(&app, "PUT", "/sessions/s1/flags/new-checkout/targets/vip", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["targetedUsers"], serde_json::json!(["vip"]));

    let (_, json) = send(&app, "GET", "/sessions/s1/flags/new-checkout/check?userId=vip", None).await;
    assert_eq!(json["enabled"], true);
    assert_eq!(json["reason"], "targeted");

    send(&app, "DELETE", "/sessions/s1/flags/new-checkout/targets/vip", None).await;
    let (_, json) = send(&app, "GET", "/sessions/s1/flags/new-checkout/check?userId=vip", None).await;
    assert_eq!(json["enabled"], false);
    assert_eq!(json["reason"], "default");
}

#[tokio::test]
async fn test_flag_toggle_and_disabled_reason() {
    let (app, _) = create_test_app();

    let (_, json) = send(&app, "POST", "/sessions/s1/flags/dark-mode/toggle", None).await;
    assert_eq!(json["enabled"], false);

    let (_, json) = send(&app, "GET", "/sessions/s1/flags/dark-mode/check?userId=u", None).await;
    assert_eq!(json["reason"], "disabled");
}

#[tokio::test]
async fn test_unknown_flag_check_and_mutation() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/sessions/s1/flags/ghost/check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["enabled"], false);
    assert_eq!(json["reason"], "default");
    assert!(json["flag"].is_null());

    let (status, json) = send(&app, "POST", "/sessions/s1/flags/ghost/toggle", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());

    let (_, json) = send(&app, "GET", "/sessions/s1/flags", None).await;
    assert_eq!(json["evaluations"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_evaluation_log_is_capped() {
    let (app, _) = create_test_app();

    for i in 0..60 {
        let uri = format!("/sessions/s1/flags/dark-mode/check?userId=user{}", i);
        send(&app, "GET", &uri, None).await;
    }

    let (_, json) = send(&app, "GET", "/sessions/s1/flags", None).await;
    let log = json["evaluations"].as_array().unwrap();
    assert_eq!(log.len(), 50);
    assert_eq!(log[0]["userId"], "user59");
    assert_eq!(log[49]["userId"], "user10");
}

#[tokio::test]
async fn test_flag_create_and_delete() {
    let (app, _) = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/sessions/s1/flags",
        Some(r#"{"key":"search-v2","name":"Search v2","enabled":true,"rolloutPercentage":100}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Search v2");

    let (status, _) = send(&app, "POST", "/sessions/s1/flags", Some(r#"{"key":"search-v2"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = send(&app, "GET", "/sessions/s1/flags/search-v2/check?userId=x", None).await;
    assert_eq!(json["reason"], "rollout");

    let (_, json) = send(&app, "DELETE", "/sessions/s1/flags/search-v2", None).await;
    assert_eq!(json["deleted"], true);

    let (status, _) = send(&app, "GET", "/sessions/s1/flags/search-v2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Session Endpoint Tests ==

#[tokio::test]
async fn test_session_lifecycle() {
    let (app, clock) = create_test_app();

    send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"k","value":1}"#)).await;
    send(&app, "POST", "/sessions/s1/rate-limit/check", None).await;

    let (status, json) = send(&app, "GET", "/sessions/s1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sessionId"], "s1");
    assert_eq!(json["requestCount"], 2);

    clock.advance(60 * 60 * 1000 + 1);

    let (_, json) = send(&app, "POST", "/maintenance/sweep", None).await;
    assert_eq!(json["sessions"], 1);
    assert_eq!(json["cacheStores"], 1);
    assert_eq!(json["rateLimitStores"], 1);

    let (status, _) = send(&app, "GET", "/sessions/s1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = send(&app, "GET", "/sessions/s1/cache/entries/k", None).await;
    assert_eq!(json["hit"], false);
}

#[tokio::test]
async fn test_destroy_session() {
    let (app, _) = create_test_app();
    send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"k","value":1}"#)).await;

    let (_, json) = send(&app, "DELETE", "/sessions/s1", None).await;
    assert_eq!(json["deleted"], true);

    let (_, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(json["activeSessions"], 0);
    assert_eq!(json["cacheStores"], 0);
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let (app, _) = create_test_app();

    let (status, _) = send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"invalid json"#)).await;

    // Axum rejects malformed JSON with 400 or 422
    assert!(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_empty_key_request() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "PUT", "/sessions/s1/cache", Some(r#"{"key":"","value":1}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
