//! Principal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::lockout::LockoutState;
use super::status::PrincipalStatus;

/// A registered account as seen by the authentication core.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Principal {
    /// Unique principal identifier.
    pub id: Uuid,
    /// Login identifier (email), matched case-insensitively.
    pub identifier: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account status.
    pub status: PrincipalStatus,
    /// Number of consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// Account locked until this time (if locked).
    pub locked_until: Option<DateTime<Utc>>,
    /// When the principal was created.
    pub created_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Principal {
    /// Build a new principal record from registration data.
    pub fn new(data: CreatePrincipal, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: data.identifier,
            password_hash: data.password_hash,
            status: data.status,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: now,
            last_login_at: None,
        }
    }

    /// The lockout part of the aggregate.
    pub fn lockout(&self) -> LockoutState {
        LockoutState {
            failed_attempts: u32::try_from(self.failed_login_attempts).unwrap_or(0),
            locked_until: self.locked_until,
        }
    }

    /// Check if the account is locked at `now`, either by cooldown or ban.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_banned() || self.lockout().is_locked_at(now)
    }

    /// Return a copy carrying the given lockout state.
    pub fn with_lockout(&self, state: LockoutState) -> Self {
        Self {
            failed_login_attempts: i32::try_from(state.failed_attempts).unwrap_or(i32::MAX),
            locked_until: state.locked_until,
            ..self.clone()
        }
    }

    /// Return a copy with the lockout cleared and the login time recorded.
    pub fn after_successful_login(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_login_at: Some(now),
            ..self.with_lockout(LockoutState::cleared())
        }
    }

    /// Return a copy with a different status.
    pub fn with_status(&self, status: PrincipalStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Data required to create a new principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    /// Login identifier (email).
    pub identifier: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Initial status.
    pub status: PrincipalStatus,
}
