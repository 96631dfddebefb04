//! Device classification derived from the client user agent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse device category recorded on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "device_type", rename_all = "lowercase")]
pub enum DeviceType {
    /// Phones.
    Mobile,
    /// Tablets.
    Tablet,
    /// Anything else that sent a user agent.
    Desktop,
    /// No user agent was supplied.
    Unknown,
}

const MOBILE_MARKERS: [&str; 3] = ["Mobile", "Android", "iPhone"];
const TABLET_MARKERS: [&str; 2] = ["Tablet", "iPad"];

impl DeviceType {
    /// Classify a user-agent string by substring matching.
    ///
    /// Mobile markers win over tablet markers, which win over the desktop
    /// fallback. A missing user agent yields [`DeviceType::Unknown`].
    pub fn classify(user_agent: Option<&str>) -> Self {
        let Some(agent) = user_agent else {
            return Self::Unknown;
        };
        if MOBILE_MARKERS.iter().any(|m| agent.contains(m)) {
            Self::Mobile
        } else if TABLET_MARKERS.iter().any(|m| agent.contains(m)) {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    /// Display name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "Mobile",
            Self::Tablet => "Tablet",
            Self::Desktop => "Desktop",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
