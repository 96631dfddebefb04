//! Integration tests driving the HTTP router over in-memory stores.

mod helpers;

mod auth_test;
mod rate_limit_test;
mod session_test;
mod two_factor_test;
