//! Failed-login lockout policy.

pub mod guard;

pub use guard::{LockStatus, LockoutGuard};
