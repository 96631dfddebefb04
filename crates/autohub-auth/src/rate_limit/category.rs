//! Endpoint categories and their bucket policies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Paths served without rate limiting.
const STATIC_PREFIXES: [&str; 4] = ["/static/", "/css/", "/js/", "/images/"];

/// Endpoint category that selects a bucket policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    /// Login endpoints.
    Authentication,
    /// Account registration.
    Registration,
    /// Email verification.
    Verification,
    /// Everything else.
    General,
}

impl RateCategory {
    /// Bucket capacity; also the number of tokens refilled per minute.
    pub fn capacity(&self) -> u32 {
        match self {
            Self::Authentication => 5,
            Self::Registration => 3,
            Self::Verification => 10,
            Self::General => 30,
        }
    }

    /// Tokens refilled per minute.
    pub fn refill_per_minute(&self) -> u32 {
        self.capacity()
    }

    /// Classifies a request path. `None` means the path is not limited.
    pub fn for_path(path: &str) -> Option<Self> {
        if path == "/favicon.ico" || STATIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
            return None;
        }
        let category = if path.starts_with("/auth/login") || path.starts_with("/api/auth/login") {
            Self::Authentication
        } else if path.starts_with("/users/register") {
            Self::Registration
        } else if path.starts_with("/users/verify") {
            Self::Verification
        } else {
            Self::General
        };
        Some(category)
    }

    /// Stable name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Registration => "registration",
            Self::Verification => "verification",
            Self::General => "general",
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
