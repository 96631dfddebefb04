//! Integration tests for the password login flow.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Duration;

use autohub_auth::PasswordHasher;
use autohub_entity::principal::PrincipalStatus;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let principal = app.create_principal("driver@example.com").await;

    let logged_in = app.login("driver@example.com").await;
    assert_eq!(logged_in.principal_id, principal.id);

    let response = app.get("/api/sessions", Some(&logged_in.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_identifier_is_case_insensitive() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;

    app.login("Driver@Example.COM").await;
}

#[tokio::test]
async fn test_wrong_password_and_unknown_identifier_look_the_same() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;

    let wrong = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "driver@example.com", "password": "nope" }),
            None,
        )
        .await;
    let unknown = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "nobody@example.com", "password": "nope" }),
            None,
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let app = TestApp::with_config(|c| c.rate_limit.enabled = false);
    app.create_principal("driver@example.com").await;
    let bad = serde_json::json!({ "identifier": "driver@example.com", "password": "nope" });

    for _ in 0..4 {
        let response = app.post("/api/auth/login", bad.clone(), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let fifth = app.post("/api/auth/login", bad.clone(), None).await;
    assert_eq!(fifth.status, StatusCode::LOCKED);
    assert_eq!(fifth.error_code(), "ACCOUNT_LOCKED");
    assert!(fifth.body["details"]["locked_until"].is_string());

    let good = serde_json::json!({ "identifier": "driver@example.com", "password": PASSWORD });
    let refused = app.post("/api/auth/login", good.clone(), None).await;
    assert_eq!(refused.status, StatusCode::LOCKED);

    app.clock.advance(Duration::minutes(31));
    let response = app.post("/api/auth/login", good, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_success_resets_failure_count() {
    let app = TestApp::with_config(|c| c.rate_limit.enabled = false);
    app.create_principal("driver@example.com").await;
    let bad = serde_json::json!({ "identifier": "driver@example.com", "password": "nope" });

    for _ in 0..4 {
        app.post("/api/auth/login", bad.clone(), None).await;
    }
    app.login("driver@example.com").await;

    for _ in 0..4 {
        let response = app.post("/api/auth/login", bad.clone(), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_inactive_and_banned_accounts() {
    let app = TestApp::new();
    app.create_principal_with("off@example.com", PASSWORD, PrincipalStatus::Inactive)
        .await;
    app.create_principal_with("banned@example.com", PASSWORD, PrincipalStatus::Banned)
        .await;

    let inactive = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "off@example.com", "password": PASSWORD }),
            None,
        )
        .await;
    assert_eq!(inactive.status, StatusCode::FORBIDDEN);

    let inactive_wrong = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "off@example.com", "password": "nope" }),
            None,
        )
        .await;
    let unknown_wrong = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "nobody@example.com", "password": "nope" }),
            None,
        )
        .await;
    assert_eq!(inactive_wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(inactive_wrong.body, unknown_wrong.body);

    let banned = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "banned@example.com", "password": PASSWORD }),
            None,
        )
        .await;
    assert_eq!(banned.status, StatusCode::LOCKED);
    assert!(banned.body["details"]["locked_until"].is_null());
}

#[tokio::test]
async fn test_empty_fields_are_rejected() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "", "password": "" }),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_or_forged_token_is_rejected() {
    let app = TestApp::new();

    let missing = app.get("/api/sessions", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let forged = app.get("/api/sessions", Some("not.a.token")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_expires() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let logged_in = app.login("driver@example.com").await;

    app.clock.advance(Duration::hours(24) + Duration::seconds(1));

    let response = app.get("/api/sessions", Some(&logged_in.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let logged_in = app.login("driver@example.com").await;

    let response = app
        .post("/api/auth/logout", serde_json::json!({}), Some(&logged_in.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let after = app.get("/api/sessions", Some(&logged_in.token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.error_code(), "SESSION_INVALID");
}

#[tokio::test]
async fn test_login_with_argon2_hash() {
    let hasher = PasswordHasher::new();
    let app = TestApp::build(|_| {}, Arc::new(hasher.clone()));
    let hash = hasher.hash_password(PASSWORD).unwrap();
    app.create_principal_with("driver@example.com", &hash, PrincipalStatus::Active)
        .await;

    app.login("driver@example.com").await;

    let wrong = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "driver@example.com", "password": "nope" }),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
}
