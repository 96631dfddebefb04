//! Application builder: wires router, transport layers and state into an
//! Axum app, and serves it until shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use autohub_core::config::app::ServerConfig;
use autohub_core::error::AppError;

use crate::middleware;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
///
/// The rate limiter, when enabled, gates every request before the routes are
/// matched, so unknown paths and wrong methods still spend a token.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();
    let body_limit = server.body_limit_kb * 1024;

    let mut app = build_router(state.clone());
    if state.config.rate_limit.enabled {
        // Layers of the outer router wrap the whole inner router.
        app = Router::new()
            .fallback_service(app)
            .layer(axum_middleware::from_fn_with_state(
                state,
                middleware::rate_limit::rate_limit,
            ));
    }

    app.layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

/// Serves the application until `shutdown` turns `true`.
pub async fn serve(
    app: Router,
    server: &ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), AppError> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(address = %addr, "AutoHub server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }
        tracing::info!("HTTP server draining connections");
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}
