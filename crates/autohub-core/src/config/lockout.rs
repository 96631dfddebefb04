//! Failed-login lockout configuration.

use serde::{Deserialize, Serialize};

/// Lockout policy applied per login identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failed attempts that lock the account.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// How long a lock lasts, in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout(),
        }
    }
}

fn default_max_failed() -> u32 {
    5
}

fn default_lockout() -> u64 {
    30
}
