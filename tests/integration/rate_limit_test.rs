//! Integration tests for per-client rate limiting.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::http::StatusCode;
use chrono::Duration;

use autohub_worker::SweepJob;
use autohub_worker::jobs::RateBucketResetJob;

use crate::helpers::{CLIENT_IP, TestApp, TestResponse};

const REMAINING: &str = "x-rate-limit-remaining";
const RETRY_AFTER: &str = "x-rate-limit-retry-after-seconds";

async fn failed_login(app: &TestApp, client_ip: &str) -> TestResponse {
    app.request(
        "POST",
        "/api/auth/login",
        Some(serde_json::json!({ "identifier": "nobody@example.com", "password": "nope" })),
        None,
        client_ip,
    )
    .await
}

#[tokio::test]
async fn test_login_bucket_allows_five_per_client() {
    let app = TestApp::new();

    let first = failed_login(&app, CLIENT_IP).await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);
    assert_eq!(first.header(REMAINING), Some("4"));

    for _ in 0..4 {
        assert_eq!(failed_login(&app, CLIENT_IP).await.status, StatusCode::UNAUTHORIZED);
    }

    let refused = failed_login(&app, CLIENT_IP).await;
    assert_eq!(refused.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(refused.error_code(), "RATE_LIMITED");
    assert_eq!(refused.header(REMAINING), Some("0"));
    assert_eq!(refused.header(RETRY_AFTER), Some("12"));

    let other_client = failed_login(&app, "203.0.113.50").await;
    assert_eq!(other_client.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bucket_refills_over_time() {
    let app = TestApp::new();
    for _ in 0..5 {
        failed_login(&app, CLIENT_IP).await;
    }
    assert_eq!(
        failed_login(&app, CLIENT_IP).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    app.clock.advance(Duration::seconds(12));
    assert_eq!(failed_login(&app, CLIENT_IP).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        failed_login(&app, CLIENT_IP).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_gate_runs_before_route_matching() {
    let app = TestApp::new();

    let unknown = app.get("/api/no-such-route", None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.header(REMAINING), Some("29"));

    for remaining in ["4", "3", "2", "1", "0"] {
        let wrong_method = app.get("/api/auth/login", None).await;
        assert_eq!(wrong_method.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(wrong_method.header(REMAINING), Some(remaining));
    }
    assert_eq!(
        failed_login(&app, CLIENT_IP).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_categories_have_separate_buckets() {
    let app = TestApp::new();
    for _ in 0..6 {
        failed_login(&app, CLIENT_IP).await;
    }

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.header(REMAINING), Some("29"));
}

#[tokio::test]
async fn test_static_paths_are_not_limited() {
    let app = TestApp::new();

    let response = app.get("/favicon.ico", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.header(REMAINING).is_none());
}

#[tokio::test]
async fn test_disabled_limiter_sends_no_headers() {
    let app = TestApp::with_config(|c| c.rate_limit.enabled = false);

    for _ in 0..10 {
        let response = failed_login(&app, CLIENT_IP).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.header(REMAINING).is_none());
    }
}

#[tokio::test]
async fn test_reset_job_restores_capacity() {
    let app = TestApp::new();
    for _ in 0..6 {
        failed_login(&app, CLIENT_IP).await;
    }

    let job = Arc::new(RateBucketResetJob::new(
        app.state.rate_limiter.clone(),
        StdDuration::from_secs(3600),
    ));
    assert_eq!(job.run().await.unwrap(), 1);

    let response = failed_login(&app, CLIENT_IP).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(REMAINING), Some("4"));
}
