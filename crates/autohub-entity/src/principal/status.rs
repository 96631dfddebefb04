//! Principal account status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account status for a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "principal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PrincipalStatus {
    /// Account is active and can log in.
    Active,
    /// Account is deactivated.
    Inactive,
    /// Account is banned by an administrator; treated as permanently locked.
    Banned,
    /// Account is awaiting verification but may log in.
    Pending,
}

impl PrincipalStatus {
    /// Check if the principal can log in with this status.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active | Self::Pending)
    }

    /// Check if the status is an explicit ban.
    pub fn is_banned(&self) -> bool {
        matches!(self, Self::Banned)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Banned => "banned",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for PrincipalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrincipalStatus {
    type Err = autohub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "banned" => Ok(Self::Banned),
            "pending" => Ok(Self::Pending),
            _ => Err(autohub_core::AppError::validation(format!(
                "Invalid principal status: '{s}'. Expected one of: active, inactive, banned, pending"
            ))),
        }
    }
}
