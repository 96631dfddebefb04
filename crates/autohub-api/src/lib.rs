//! # autohub-api
//!
//! HTTP API layer for the AutoHub identity service built on Axum.
//!
//! Provides the login, two-factor and session endpoints, the bearer-token
//! extractor, rate-limit and logging middleware, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::{AppState, Stores};
