//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use autohub_auth::{Enrollment, EstablishedSession, IssuedToken};
use autohub_entity::session::Session;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of either login step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginResponse {
    /// Logged in; the token is bound to a new session.
    Authenticated(SessionTokenResponse),
    /// Password accepted; call `/api/auth/2fa/verify` next.
    TwoFactorRequired {
        /// Short-lived challenge token.
        challenge_token: String,
        /// Challenge expiry.
        expires_at: DateTime<Utc>,
    },
}

impl LoginResponse {
    /// Second step pending.
    pub fn challenge(token: IssuedToken) -> Self {
        Self::TwoFactorRequired {
            challenge_token: token.token,
            expires_at: token.expires_at,
        }
    }
}

impl From<EstablishedSession> for LoginResponse {
    fn from(established: EstablishedSession) -> Self {
        Self::Authenticated(SessionTokenResponse {
            principal_id: established.principal_id,
            session_id: established.session.id,
            access_token: established.access_token.token,
            expires_at: established.access_token.expires_at,
        })
    }
}

/// Access token bound to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokenResponse {
    /// Principal ID.
    pub principal_id: Uuid,
    /// Session the token belongs to.
    pub session_id: Uuid,
    /// Bearer token.
    pub access_token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Two-factor setup material, shown once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    /// Base32 secret.
    pub secret: String,
    /// `otpauth://` URI.
    pub provisioning_uri: String,
    /// Single-use backup codes.
    pub backup_codes: Vec<String>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            secret: enrollment.secret,
            provisioning_uri: enrollment.provisioning_uri,
            backup_codes: enrollment.backup_codes,
        }
    }
}

/// Two-factor state after a change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorStatusResponse {
    /// Whether the second factor is enforced.
    pub enabled: bool,
}

/// Session listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Session ID.
    pub id: Uuid,
    /// Client address at creation.
    pub ip_address: String,
    /// User agent at creation.
    pub user_agent: Option<String>,
    /// Device category.
    pub device: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last activity.
    pub last_active_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Whether this is the session of the calling request.
    pub current: bool,
}

impl SessionResponse {
    /// Builds an entry, marking the caller's own session.
    pub fn from_session(session: Session, current_id: Uuid) -> Self {
        Self {
            current: session.id == current_id,
            device: session.device_info.to_string(),
            id: session.id,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
            created_at: session.created_at,
            last_active_at: session.last_active_at,
            expires_at: session.expires_at,
        }
    }
}

/// Number of sessions ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminatedResponse {
    /// Sessions terminated.
    pub terminated: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Server time.
    pub time: DateTime<Utc>,
}
