//! Two-factor profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a principal's second factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwoFactorState {
    /// Never enrolled.
    Unset,
    /// A secret is staged and awaits confirmation.
    Pending,
    /// Confirmed and enforced at login.
    Enabled,
    /// Explicitly turned off.
    Disabled,
}

/// TOTP secret, backup codes and enrollment state for one principal.
///
/// Backup codes are stored as digests; the plaintext codes are only ever
/// shown once, at enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TwoFactorProfile {
    /// Owning principal.
    pub principal_id: Uuid,
    /// Whether the second factor is enforced.
    pub enabled: bool,
    /// Active base32 secret.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// Digests of the remaining single-use backup codes.
    #[serde(skip_serializing)]
    pub backup_codes: Vec<String>,
    /// Staged base32 secret awaiting confirmation.
    #[serde(skip_serializing)]
    pub pending_secret: Option<String>,
    /// Digests of the backup codes issued with the staged secret.
    #[serde(skip_serializing)]
    pub pending_backup_codes: Vec<String>,
    /// When the factor was last disabled.
    pub disabled_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TwoFactorProfile {
    /// A profile for a principal that never enrolled.
    pub fn unset(principal_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            principal_id,
            enabled: false,
            secret: None,
            backup_codes: Vec::new(),
            pending_secret: None,
            pending_backup_codes: Vec::new(),
            disabled_at: None,
            updated_at: now,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TwoFactorState {
        if self.enabled {
            TwoFactorState::Enabled
        } else if self.pending_secret.is_some() {
            TwoFactorState::Pending
        } else if self.disabled_at.is_some() {
            TwoFactorState::Disabled
        } else {
            TwoFactorState::Unset
        }
    }

    /// A copy with a staged secret and its backup-code digests.
    ///
    /// An already enabled factor stays enforced with its current secret until
    /// the staged one is confirmed.
    pub fn staged(&self, secret: String, backup_codes: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            pending_secret: Some(secret),
            pending_backup_codes: backup_codes,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Whether `secret` is the one currently staged.
    pub fn is_staged(&self, secret: &str) -> bool {
        self.pending_secret.as_deref() == Some(secret)
    }

    /// A copy with the staged secret promoted to the active one.
    ///
    /// Returns `None` when nothing is staged.
    pub fn confirmed(&self, now: DateTime<Utc>) -> Option<Self> {
        let secret = self.pending_secret.clone()?;
        Some(Self {
            principal_id: self.principal_id,
            enabled: true,
            secret: Some(secret),
            backup_codes: self.pending_backup_codes.clone(),
            pending_secret: None,
            pending_backup_codes: Vec::new(),
            disabled_at: None,
            updated_at: now,
        })
    }

    /// A copy with the secret, backup codes and any staged enrollment cleared.
    pub fn disabled(&self, now: DateTime<Utc>) -> Self {
        Self {
            principal_id: self.principal_id,
            enabled: false,
            secret: None,
            backup_codes: Vec::new(),
            pending_secret: None,
            pending_backup_codes: Vec::new(),
            disabled_at: Some(now),
            updated_at: now,
        }
    }

    /// A copy without the given backup-code digest.
    ///
    /// Returns `None` when the digest is not among the remaining codes.
    pub fn without_backup_code(&self, digest: &str, now: DateTime<Utc>) -> Option<Self> {
        let position = self.backup_codes.iter().position(|c| c == digest)?;
        let mut backup_codes = self.backup_codes.clone();
        backup_codes.swap_remove(position);
        Some(Self {
            backup_codes,
            updated_at: now,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes() -> Vec<String> {
        vec!["d1".to_string(), "d2".to_string(), "d3".to_string()]
    }

    #[test]
    fn test_lifecycle() {
        let now = Utc::now();
        let profile = TwoFactorProfile::unset(Uuid::new_v4(), now);
        assert_eq!(profile.state(), TwoFactorState::Unset);

        let pending = profile.staged("SECRET".to_string(), codes(), now);
        assert_eq!(pending.state(), TwoFactorState::Pending);
        assert!(pending.is_staged("SECRET"));
        assert!(!pending.is_staged("OTHER"));

        let enabled = pending.confirmed(now).unwrap();
        assert_eq!(enabled.state(), TwoFactorState::Enabled);
        assert_eq!(enabled.secret.as_deref(), Some("SECRET"));
        assert_eq!(enabled.backup_codes, codes());
        assert!(enabled.pending_secret.is_none());

        let disabled = enabled.disabled(now);
        assert_eq!(disabled.state(), TwoFactorState::Disabled);
        assert!(disabled.secret.is_none());
        assert!(disabled.backup_codes.is_empty());
        assert_eq!(disabled.disabled(now).state(), TwoFactorState::Disabled);
    }

    #[test]
    fn test_confirm_without_stage_is_none() {
        let profile = TwoFactorProfile::unset(Uuid::new_v4(), Utc::now());
        assert!(profile.confirmed(Utc::now()).is_none());
    }

    #[test]
    fn test_backup_code_removed_once() {
        let now = Utc::now();
        let enabled = TwoFactorProfile::unset(Uuid::new_v4(), now)
            .staged("S".to_string(), codes(), now)
            .confirmed(now)
            .unwrap();

        let used = enabled.without_backup_code("d2", now).unwrap();
        assert_eq!(used.backup_codes.len(), 2);
        assert!(used.without_backup_code("d2", now).is_none());
        assert_eq!(enabled.backup_codes.len(), 3);
    }
}
