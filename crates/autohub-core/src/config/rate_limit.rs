//! Request rate limiting configuration.
//!
//! Bucket capacities per endpoint category are fixed policy and are not
//! configurable here; only the operational knobs are.

use serde::{Deserialize, Serialize};

/// Rate limiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the rate limiting middleware is installed.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between full bucket resets in minutes.
    #[serde(default = "default_reset_interval")]
    pub reset_interval_minutes: u64,
    /// Whether the first `X-Forwarded-For` entry identifies the client.
    #[serde(default = "default_true")]
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reset_interval_minutes: default_reset_interval(),
            trust_forwarded_for: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reset_interval() -> u64 {
    60
}
