//! Integration tests for session tracking and termination.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::Map;
use uuid::Uuid;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_list_marks_current_session() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let first = app.login("driver@example.com").await;
    let second = app.login("driver@example.com").await;

    let response = app.get("/api/sessions", Some(&second.token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let sessions = response.data().as_array().cloned().unwrap_or_default();
    assert_eq!(sessions.len(), 2);
    for session in &sessions {
        let is_second = session["id"] == second.session_id.to_string();
        assert_eq!(session["current"], is_second);
        assert_eq!(session["device"], "Desktop");
    }
    assert!(sessions.iter().any(|s| s["id"] == first.session_id.to_string()));
}

#[tokio::test]
async fn test_terminate_one_session() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let phone = app.login("driver@example.com").await;
    let laptop = app.login("driver@example.com").await;

    let response = app
        .delete(&format!("/api/sessions/{}", phone.session_id), Some(&laptop.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let rejected = app.get("/api/sessions", Some(&phone.token)).await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.error_code(), "SESSION_INVALID");

    let still_ok = app.get("/api/sessions", Some(&laptop.token)).await;
    assert_eq!(still_ok.status, StatusCode::OK);
}

#[tokio::test]
async fn test_cannot_terminate_foreign_or_missing_session() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    app.create_principal("other@example.com").await;
    let mine = app.login("driver@example.com").await;
    let theirs = app.login("other@example.com").await;

    let foreign = app
        .delete(&format!("/api/sessions/{}", theirs.session_id), Some(&mine.token))
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let missing = app
        .delete(&format!("/api/sessions/{}", Uuid::new_v4()), Some(&mine.token))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let untouched = app.get("/api/sessions", Some(&theirs.token)).await;
    assert_eq!(untouched.status, StatusCode::OK);
}

#[tokio::test]
async fn test_terminate_all_other_sessions() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let others = [
        app.login("driver@example.com").await,
        app.login("driver@example.com").await,
    ];
    let current = app.login("driver@example.com").await;

    let response = app.delete("/api/sessions", Some(&current.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["terminated"], 2);

    for other in &others {
        let rejected = app.get("/api/sessions", Some(&other.token)).await;
        assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    }
    let listing = app.get("/api/sessions", Some(&current.token)).await;
    assert_eq!(listing.data().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_session_expiry_rejects_live_token() {
    let app = TestApp::with_config(|c| c.auth.token_validity_seconds = 48 * 3600);
    app.create_principal("driver@example.com").await;
    let logged_in = app.login("driver@example.com").await;

    app.clock.advance(Duration::hours(23));
    let before = app.get("/api/sessions", Some(&logged_in.token)).await;
    assert_eq!(before.status, StatusCode::OK);

    app.clock.advance(Duration::hours(1) + Duration::seconds(1));
    let after = app.get("/api/sessions", Some(&logged_in.token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.error_code(), "SESSION_INVALID");
}

#[tokio::test]
async fn test_activity_never_extends_expiry() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let logged_in = app.login("driver@example.com").await;
    let created = app
        .state
        .sessions
        .find(logged_in.session_id)
        .await
        .unwrap()
        .unwrap();

    app.clock.advance(Duration::hours(2));
    app.get("/api/sessions", Some(&logged_in.token)).await;

    let touched = app
        .state
        .sessions
        .find(logged_in.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(touched.expires_at, created.expires_at);
    assert!(touched.last_active_at > created.last_active_at);
}

#[tokio::test]
async fn test_token_without_session_gets_one_on_first_use() {
    let app = TestApp::new();
    let principal = app.create_principal("driver@example.com").await;
    let issued = app
        .state
        .tokens
        .issue(&principal.id.to_string(), Map::new())
        .unwrap();

    let first = app.get("/api/sessions", Some(&issued.token)).await;
    assert_eq!(first.status, StatusCode::OK);
    let second = app.get("/api/sessions", Some(&issued.token)).await;

    let sessions = second.data().as_array().cloned().unwrap_or_default();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["current"], true);
    assert_eq!(sessions[0]["ip_address"], crate::helpers::CLIENT_IP);
}

#[tokio::test]
async fn test_sweep_removes_terminated_sessions() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let logged_in = app.login("driver@example.com").await;
    app.post("/api/auth/logout", serde_json::json!({}), Some(&logged_in.token))
        .await;

    assert_eq!(app.state.sessions.sweep_expired().await.unwrap(), 1);
    assert!(
        app.state
            .sessions
            .find(logged_in.session_id)
            .await
            .unwrap()
            .is_none()
    );
}
