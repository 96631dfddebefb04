//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::device::DeviceType;

/// A tracked login session.
///
/// Expiry is fixed at creation. Activity only moves `last_active_at`;
/// termination only clears `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The principal this session belongs to.
    pub principal_id: Uuid,
    /// Client IP address as observed at creation.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Device category derived from the user agent.
    pub device_info: DeviceType,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last authenticated request bearing this session.
    pub last_active_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Cleared on termination.
    pub active: bool,
}

impl Session {
    /// Open a new session at `now` that expires after `ttl`.
    pub fn open(data: NewSession, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            principal_id: data.principal_id,
            ip_address: data.ip_address,
            user_agent: data.user_agent,
            device_info: data.device_info,
            created_at: now,
            last_active_at: now,
            expires_at: now + ttl,
            active: true,
        }
    }

    /// A copy with `last_active_at` moved to `now`. Expiry is unchanged.
    pub fn touched(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_active_at: now,
            ..self.clone()
        }
    }

    /// A terminated copy.
    pub fn terminated(&self) -> Self {
        Self {
            active: false,
            ..self.clone()
        }
    }

    /// Whether the session may still authenticate requests at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }

    /// Whether the periodic sweep removes this session at `now`.
    pub fn is_sweepable_at(&self, now: DateTime<Utc>) -> bool {
        !self.active || self.expires_at < now
    }
}

/// Data required to open a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// The principal the session belongs to.
    pub principal_id: Uuid,
    /// Client IP address.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Device category.
    pub device_info: DeviceType,
}

impl NewSession {
    /// Build session data, classifying the device from the user agent.
    pub fn from_client(principal_id: Uuid, ip_address: String, user_agent: Option<String>) -> Self {
        let device_info = DeviceType::classify(user_agent.as_deref());
        Self {
            principal_id,
            ip_address,
            user_agent,
            device_info,
        }
    }
}
