//! Integration tests for two-factor enrollment and the second login step.

use axum::http::StatusCode;
use chrono::Duration;

use autohub_auth::two_factor::totp;
use autohub_core::traits::Clock;

use crate::helpers::{LoggedIn, PASSWORD, TestApp};

struct Enrolled {
    secret: String,
    backup_codes: Vec<String>,
}

async fn enroll(app: &TestApp, logged_in: &LoggedIn) -> Enrolled {
    let setup = app
        .post("/api/account/2fa/setup", serde_json::json!({}), Some(&logged_in.token))
        .await;
    assert_eq!(setup.status, StatusCode::OK);
    let secret = setup.data()["secret"].as_str().unwrap().to_string();
    let backup_codes: Vec<String> = setup.data()["backup_codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect();
    assert!(
        setup.data()["provisioning_uri"]
            .as_str()
            .unwrap()
            .starts_with("otpauth://totp/AutoHub:driver%40example.com?secret=")
    );

    let code = totp::current_code(&secret, app.clock.now()).unwrap();
    let confirm = app
        .post(
            "/api/account/2fa/confirm",
            serde_json::json!({ "secret": secret, "code": code }),
            Some(&logged_in.token),
        )
        .await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert_eq!(confirm.data()["enabled"], true);

    Enrolled {
        secret,
        backup_codes,
    }
}

async fn password_step(app: &TestApp) -> String {
    let response = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "identifier": "driver@example.com", "password": PASSWORD }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "two_factor_required");
    assert!(response.data().get("access_token").is_none());
    response.data()["challenge_token"].as_str().unwrap().to_string()
}

fn wrong_code(good: &str) -> &'static str {
    if good == "000000" { "111111" } else { "000000" }
}

#[tokio::test]
async fn test_totp_login_round() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let first = app.login("driver@example.com").await;
    let enrolled = enroll(&app, &first).await;

    app.clock.advance(Duration::minutes(2));
    let challenge = password_step(&app).await;
    let code = totp::current_code(&enrolled.secret, app.clock.now()).unwrap();

    let response = app
        .post(
            "/api/auth/2fa/verify",
            serde_json::json!({ "challenge_token": challenge, "code": code }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "authenticated");

    let logged_in = LoggedIn::from_data(response.data());
    let sessions = app.get("/api/sessions", Some(&logged_in.token)).await;
    assert_eq!(sessions.status, StatusCode::OK);
}

#[tokio::test]
async fn test_challenge_token_is_not_an_access_token() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let first = app.login("driver@example.com").await;
    enroll(&app, &first).await;

    let challenge = password_step(&app).await;

    let response = app.get("/api/sessions", Some(&challenge)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_code_is_refused_and_counts_toward_lockout() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let first = app.login("driver@example.com").await;
    let enrolled = enroll(&app, &first).await;

    let challenge = password_step(&app).await;
    let good = totp::current_code(&enrolled.secret, app.clock.now()).unwrap();
    let wrong = serde_json::json!({ "challenge_token": challenge, "code": wrong_code(&good) });

    for _ in 0..4 {
        let response = app.post("/api/auth/2fa/verify", wrong.clone(), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "TWO_FACTOR_FAILED");
    }
    let fifth = app.post("/api/auth/2fa/verify", wrong, None).await;
    assert_eq!(fifth.status, StatusCode::LOCKED);

    let with_good_code = app
        .post(
            "/api/auth/2fa/verify",
            serde_json::json!({ "challenge_token": challenge, "code": good }),
            None,
        )
        .await;
    assert_eq!(with_good_code.status, StatusCode::LOCKED);
}

#[tokio::test]
async fn test_backup_code_is_single_use() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let first = app.login("driver@example.com").await;
    let enrolled = enroll(&app, &first).await;
    let backup = &enrolled.backup_codes[0];

    let challenge = password_step(&app).await;
    let body = serde_json::json!({
        "challenge_token": challenge,
        "code": backup,
        "backup_code": true,
    });

    let used = app.post("/api/auth/2fa/verify", body.clone(), None).await;
    assert_eq!(used.status, StatusCode::OK);

    let reused = app.post("/api/auth/2fa/verify", body, None).await;
    assert_eq!(reused.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_challenge_is_refused() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let first = app.login("driver@example.com").await;
    let enrolled = enroll(&app, &first).await;

    let challenge = password_step(&app).await;
    app.clock.advance(Duration::seconds(301));
    let code = totp::current_code(&enrolled.secret, app.clock.now()).unwrap();

    let response = app
        .post(
            "/api/auth/2fa/verify",
            serde_json::json!({ "challenge_token": challenge, "code": code }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_confirm_with_wrong_code_keeps_factor_off() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let logged_in = app.login("driver@example.com").await;

    let setup = app
        .post("/api/account/2fa/setup", serde_json::json!({}), Some(&logged_in.token))
        .await;
    let secret = setup.data()["secret"].as_str().unwrap().to_string();
    let good = totp::current_code(&secret, app.clock.now()).unwrap();

    let confirm = app
        .post(
            "/api/account/2fa/confirm",
            serde_json::json!({ "secret": secret, "code": wrong_code(&good) }),
            Some(&logged_in.token),
        )
        .await;
    assert_eq!(confirm.status, StatusCode::BAD_REQUEST);

    app.login("driver@example.com").await;
}

#[tokio::test]
async fn test_disable_restores_single_step_login() {
    let app = TestApp::new();
    app.create_principal("driver@example.com").await;
    let first = app.login("driver@example.com").await;
    enroll(&app, &first).await;

    let response = app
        .post("/api/account/2fa/disable", serde_json::json!({}), Some(&first.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["enabled"], false);

    let again = app
        .post("/api/account/2fa/disable", serde_json::json!({}), Some(&first.token))
        .await;
    assert_eq!(again.status, StatusCode::OK);

    app.login("driver@example.com").await;
}
