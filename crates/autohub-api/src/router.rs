//! Route definitions for the AutoHub HTTP API.
//!
//! Authentication and account routes are mounted under `/api`; the health
//! check lives at the root.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(account_routes())
        .merge(session_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .with_state(state)
}

/// Login, second factor, logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/2fa/verify", post(handlers::auth::verify_two_factor))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// Two-factor enrollment of the caller
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account/2fa/setup", post(handlers::two_factor::setup))
        .route("/account/2fa/confirm", post(handlers::two_factor::confirm))
        .route("/account/2fa/disable", post(handlers::two_factor::disable))
}

/// Session listing and termination
fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions",
            get(handlers::sessions::list_sessions)
                .delete(handlers::sessions::terminate_other_sessions),
        )
        .route(
            "/sessions/{id}",
            delete(handlers::sessions::terminate_session),
        )
}
