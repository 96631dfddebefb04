//! AutoHub identity server: authentication and session security.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use autohub_api::{AppState, Stores};
use autohub_auth::PasswordHasher;
use autohub_core::config::AppConfig;
use autohub_core::traits::SystemClock;
use autohub_database::DatabasePool;
use autohub_worker::SweepRunner;
use autohub_worker::jobs::{RateBucketResetJob, SessionSweepJob, TokenCacheSweepJob};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("AUTOHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("Failed to load configuration")?;

    init_logging(&config);
    tracing::info!(env = %env, "Starting AutoHub v{}", env!("CARGO_PKG_VERSION"));

    run(config).await
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    // ── Step 1: Stores ───────────────────────────────────────────
    let (stores, db) = match config.database.url {
        Some(_) => {
            tracing::info!("Connecting to database...");
            let db = DatabasePool::connect(&config.database)
                .await
                .context("Database connection failed")?;
            if config.database.run_migrations {
                autohub_database::migration::run_migrations(db.pool())
                    .await
                    .context("Migration failed")?;
                tracing::info!("Database migrations complete");
            }
            (Stores::postgres(&db), Some(db))
        }
        None => {
            tracing::warn!("No database URL configured; state is kept in memory");
            (Stores::in_memory(), None)
        }
    };

    // ── Step 2: Services ─────────────────────────────────────────
    let state = AppState::new(
        config.clone(),
        stores,
        Arc::new(PasswordHasher::new()),
        Arc::new(SystemClock),
    );

    // ── Step 3: Sweep jobs ───────────────────────────────────────
    let mut sweeps = SweepRunner::new();
    sweeps.register(Arc::new(TokenCacheSweepJob::new(
        Arc::clone(&state.tokens),
        Duration::from_secs(config.auth.cache_sweep_interval_seconds),
    )));
    sweeps.register(Arc::new(SessionSweepJob::new(
        Arc::clone(&state.sessions),
        Duration::from_secs(config.session.sweep_interval_minutes * 60),
    )));
    if config.rate_limit.enabled {
        sweeps.register(Arc::new(RateBucketResetJob::new(
            state.rate_limiter.clone(),
            Duration::from_secs(config.rate_limit.reset_interval_minutes * 60),
        )));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_handles = sweeps.spawn(shutdown_rx.clone());

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = autohub_api::build_app(state);
    let server = tokio::spawn({
        let server_config = config.server.clone();
        async move { autohub_api::serve(app, &server_config, shutdown_rx).await }
    });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    server
        .await
        .context("Server task panicked")?
        .context("Server error")?;
    for handle in sweep_handles {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Sweep task ended abnormally");
        }
    }
    if let Some(db) = db {
        db.close().await;
    }

    tracing::info!("AutoHub stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
