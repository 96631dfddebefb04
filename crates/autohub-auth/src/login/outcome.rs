//! Login results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use autohub_entity::session::Session;

use crate::token::IssuedToken;

/// Where a login attempt comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client address as seen by the service.
    pub ip_address: String,
    /// Raw `User-Agent` header.
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Builds client info from its parts.
    pub fn new(ip_address: impl Into<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent,
        }
    }
}

/// A session opened by a completed login and the token bound to it.
#[derive(Debug, Clone, Serialize)]
pub struct EstablishedSession {
    /// Authenticated principal.
    pub principal_id: Uuid,
    /// The new session.
    pub session: Session,
    /// Access token carrying the session id.
    pub access_token: IssuedToken,
}

/// Result of the password step.
///
/// Unknown identifiers and wrong passwords both yield
/// [`InvalidCredentials`](Self::InvalidCredentials).
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Password accepted and no second factor enforced.
    Authenticated(EstablishedSession),
    /// Password accepted; a second factor must follow.
    TwoFactorRequired {
        /// Short-lived challenge token for the second step.
        challenge: IssuedToken,
    },
    /// Unknown identifier or wrong password.
    InvalidCredentials,
    /// Locked by repeated failures or banned.
    Locked {
        /// When the lock lifts; `None` for a ban.
        locked_until: Option<DateTime<Utc>>,
    },
    /// The account status does not allow logging in.
    AccountDisabled,
}

/// Result of the second-factor step.
#[derive(Debug, Clone)]
pub enum SecondFactorOutcome {
    /// Code accepted.
    Authenticated(EstablishedSession),
    /// Challenge token missing, expired or forged.
    InvalidChallenge,
    /// Wrong or already used code.
    InvalidCode,
    /// Locked by repeated failures or banned.
    Locked {
        /// When the lock lifts; `None` for a ban.
        locked_until: Option<DateTime<Utc>>,
    },
}
