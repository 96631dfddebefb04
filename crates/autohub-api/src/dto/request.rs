//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login identifier (email).
    #[validate(length(min = 1, max = 320, message = "Identifier is required"))]
    pub identifier: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Second login step.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TwoFactorVerifyRequest {
    /// Challenge token returned by the password step.
    #[validate(length(min = 1, message = "Challenge token is required"))]
    pub challenge_token: String,
    /// TOTP code, or a backup code when `backup_code` is set.
    #[validate(length(min = 6, max = 32))]
    pub code: String,
    /// Whether `code` is a backup code.
    #[serde(default)]
    pub backup_code: bool,
}

/// Confirms a staged two-factor secret.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmTwoFactorRequest {
    /// The secret returned by setup.
    #[validate(length(min = 16, message = "Secret is required"))]
    pub secret: String,
    /// Current code from the authenticator.
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}
