//! Token signing and verification configuration.

use serde::{Deserialize, Serialize};

/// Bearer token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token validity window in seconds.
    #[serde(default = "default_token_validity")]
    pub token_validity_seconds: u64,
    /// Validity window of the challenge token issued between the password
    /// step and the second factor, in seconds.
    #[serde(default = "default_two_factor_token_validity")]
    pub two_factor_token_validity_seconds: u64,
    /// Maximum cached successful verifications per subject.
    #[serde(default = "default_cache_entries")]
    pub cache_entries_per_subject: usize,
    /// Interval between verification-cache sweeps in seconds.
    #[serde(default = "default_cache_sweep_interval")]
    pub cache_sweep_interval_seconds: u64,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default)]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_validity_seconds: default_token_validity(),
            two_factor_token_validity_seconds: default_two_factor_token_validity(),
            cache_entries_per_subject: default_cache_entries(),
            cache_sweep_interval_seconds: default_cache_sweep_interval(),
            leeway_seconds: 0,
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION_0123456789abcdef".to_string()
}

fn default_token_validity() -> u64 {
    86_400
}

fn default_two_factor_token_validity() -> u64 {
    300
}

fn default_cache_entries() -> usize {
    5
}

fn default_cache_sweep_interval() -> u64 {
    3_600
}
