//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use autohub_api::{AppState, Stores};
use autohub_auth::CredentialVerifier;
use autohub_core::config::AppConfig;
use autohub_core::error::AppError;
use autohub_core::traits::{Clock, ManualClock};
use autohub_database::{MemoryPrincipalStore, PrincipalStore};
use autohub_entity::principal::{CreatePrincipal, Principal, PrincipalStatus};

/// Default client address sent in `X-Forwarded-For`.
pub const CLIENT_IP: &str = "198.51.100.7";
/// Password of every test principal.
pub const PASSWORD: &str = "correct horse battery";

/// Compares plaintext; keeps lockout tests fast.
#[derive(Debug)]
pub struct PlainVerifier;

impl CredentialVerifier for PlainVerifier {
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AppError> {
        Ok(password == stored_hash)
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Clock driving every expiry
    pub clock: Arc<ManualClock>,
    /// Principal store, for seeding accounts
    pub principals: Arc<MemoryPrincipalStore>,
}

impl TestApp {
    /// Create a test application with default settings
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application with adjusted settings
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(adjust, Arc::new(PlainVerifier))
    }

    /// Create a test application with a specific credential verifier
    pub fn build(
        adjust: impl FnOnce(&mut AppConfig),
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let mut config = AppConfig::default();
        adjust(&mut config);

        let clock = Arc::new(ManualClock::starting_now());
        let principals = Arc::new(MemoryPrincipalStore::new());
        let stores = Stores {
            principals: principals.clone(),
            ..Stores::in_memory()
        };

        let state = AppState::new(config, stores, credentials, clock.clone());
        let router = autohub_api::build_app(state.clone());

        Self {
            router,
            state,
            clock,
            principals,
        }
    }

    /// Seed an active principal whose stored hash is the plaintext password
    pub async fn create_principal(&self, identifier: &str) -> Principal {
        self.create_principal_with(identifier, PASSWORD, PrincipalStatus::Active)
            .await
    }

    /// Seed a principal with an explicit stored hash and status
    pub async fn create_principal_with(
        &self,
        identifier: &str,
        password_hash: &str,
        status: PrincipalStatus,
    ) -> Principal {
        let principal = Principal::new(
            CreatePrincipal {
                identifier: identifier.to_string(),
                password_hash: password_hash.to_string(),
                status,
            },
            self.clock.now(),
        );
        self.principals
            .insert(&principal)
            .await
            .expect("Failed to seed principal")
    }

    /// Log in with the test password and return the access token
    pub async fn login(&self, identifier: &str) -> LoggedIn {
        let response = self
            .post(
                "/api/auth/login",
                serde_json::json!({ "identifier": identifier, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        assert_eq!(response.data()["status"], "authenticated");
        LoggedIn::from_data(response.data())
    }

    /// POST a JSON body
    pub async fn post(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request("POST", path, Some(body), token, CLIENT_IP).await
    }

    /// GET without a body
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("GET", path, None, token, CLIENT_IP).await
    }

    /// DELETE without a body
    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("DELETE", path, None, token, CLIENT_IP).await
    }

    /// Make a request from the given client address
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        client_ip: &str,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", client_ip)
            .header("User-Agent", "autohub-tests/1.0");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The machine-readable error code of a failure
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// A header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Credentials returned by a successful login
#[derive(Debug, Clone)]
pub struct LoggedIn {
    /// Bearer token
    pub token: String,
    /// Session the token is bound to
    pub session_id: Uuid,
    /// Principal ID
    pub principal_id: Uuid,
}

impl LoggedIn {
    /// Read the authenticated login payload
    pub fn from_data(data: &Value) -> Self {
        Self {
            token: data["access_token"]
                .as_str()
                .expect("access_token missing")
                .to_string(),
            session_id: data["session_id"]
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .expect("session_id missing"),
            principal_id: data["principal_id"]
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .expect("principal_id missing"),
        }
    }
}
