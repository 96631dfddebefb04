//! Two-factor authentication configuration.

use serde::{Deserialize, Serialize};

/// TOTP enrollment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorConfig {
    /// Issuer shown by authenticator apps.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Number of backup codes generated per enrollment.
    #[serde(default = "default_backup_code_count")]
    pub backup_code_count: usize,
    /// Length of each backup code.
    #[serde(default = "default_backup_code_length")]
    pub backup_code_length: usize,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            backup_code_count: default_backup_code_count(),
            backup_code_length: default_backup_code_length(),
        }
    }
}

fn default_issuer() -> String {
    "AutoHub".to_string()
}

fn default_backup_code_count() -> usize {
    10
}

fn default_backup_code_length() -> usize {
    8
}
