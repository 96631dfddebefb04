//! Request handlers, one module per route group.

pub mod auth;
pub mod health;
pub mod sessions;
pub mod two_factor;
