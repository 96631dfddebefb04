//! TOTP enrollment, backup codes and second-factor verification.

pub mod backup;
pub mod service;
pub mod totp;

pub use service::{Enrollment, TwoFactorAuth};
