//! Two-factor authentication entities.

pub mod profile;

pub use profile::{TwoFactorProfile, TwoFactorState};
