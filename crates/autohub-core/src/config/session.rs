//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime in hours, fixed at creation.
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: u64,
    /// Interval between expired-session sweeps in minutes.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_hours: default_expiry_hours(),
            sweep_interval_minutes: default_sweep_interval(),
        }
    }
}

fn default_expiry_hours() -> u64 {
    24
}

fn default_sweep_interval() -> u64 {
    60
}
