//! Two-factor enrollment and verification.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use autohub_core::config::two_factor::TwoFactorConfig;
use autohub_core::result::AppResult;
use autohub_core::traits::Clock;
use autohub_database::store::TwoFactorStore;

use super::{backup, totp};

/// Material shown to the user once, when enrollment begins.
#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    /// Base32 secret to type into an authenticator.
    pub secret: String,
    /// `otpauth://` URI for QR rendering.
    pub provisioning_uri: String,
    /// Plaintext single-use backup codes.
    pub backup_codes: Vec<String>,
}

/// TOTP-based second factor.
#[derive(Clone)]
pub struct TwoFactorAuth {
    /// Profile persistence.
    store: Arc<dyn TwoFactorStore>,
    /// Time source for TOTP steps.
    clock: Arc<dyn Clock>,
    /// Enrollment settings.
    config: TwoFactorConfig,
}

impl std::fmt::Debug for TwoFactorAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoFactorAuth")
            .field("config", &self.config)
            .finish()
    }
}

impl TwoFactorAuth {
    /// Creates the service.
    pub fn new(config: TwoFactorConfig, store: Arc<dyn TwoFactorStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Stages a fresh secret and backup codes for `principal_id`.
    ///
    /// Nothing is enforced until [`confirm_enrollment`](Self::confirm_enrollment)
    /// succeeds; an already enabled factor stays in force meanwhile.
    pub async fn begin_enrollment(&self, principal_id: Uuid, label: &str) -> AppResult<Enrollment> {
        let now = self.clock.now();
        let secret = totp::generate_secret();
        let backup_codes =
            backup::generate(self.config.backup_code_count, self.config.backup_code_length);
        let digests: Vec<String> = backup_codes.iter().map(|code| backup::digest(code)).collect();

        self.store.stage(principal_id, &secret, &digests, now).await?;

        info!(principal_id = %principal_id, "Two-factor enrollment started");

        Ok(Enrollment {
            provisioning_uri: totp::provisioning_uri(&self.config.issuer, label, &secret),
            secret,
            backup_codes,
        })
    }

    /// Confirms a staged secret with one valid code.
    ///
    /// On success the staged secret and backup codes become active. On
    /// failure nothing changes.
    pub async fn confirm_enrollment(
        &self,
        principal_id: Uuid,
        staged_secret: &str,
        code: &str,
    ) -> AppResult<bool> {
        let now = self.clock.now();
        if !totp::verify_code(staged_secret, code, now) {
            debug!(principal_id = %principal_id, "Two-factor confirmation rejected");
            return Ok(false);
        }
        if !self.store.promote_pending(principal_id, staged_secret, now).await? {
            debug!(principal_id = %principal_id, "No matching staged secret");
            return Ok(false);
        }

        info!(principal_id = %principal_id, "Two-factor authentication enabled");
        Ok(true)
    }

    /// Turns the second factor off and clears its secret and codes.
    ///
    /// Idempotent.
    pub async fn disable(&self, principal_id: Uuid) -> AppResult<()> {
        if self.store.disable(principal_id, self.clock.now()).await? {
            info!(principal_id = %principal_id, "Two-factor authentication disabled");
        }
        Ok(())
    }

    /// Checks a TOTP code, or consumes a backup code.
    ///
    /// Always `false` while the factor is not enabled.
    pub async fn verify(&self, principal_id: Uuid, code: &str, is_backup_code: bool) -> AppResult<bool> {
        let now = self.clock.now();
        let Some(profile) = self.store.find(principal_id).await? else {
            return Ok(false);
        };
        if !profile.enabled {
            return Ok(false);
        }

        if is_backup_code {
            let consumed = self
                .store
                .consume_backup_code(principal_id, &backup::digest(code), now)
                .await?;
            if consumed {
                info!(principal_id = %principal_id, "Backup code consumed");
            }
            return Ok(consumed);
        }

        Ok(profile
            .secret
            .as_deref()
            .is_some_and(|secret| totp::verify_code(secret, code, now)))
    }

    /// Whether the second factor is enforced for `principal_id`.
    pub async fn is_enabled(&self, principal_id: Uuid) -> AppResult<bool> {
        Ok(self
            .store
            .find(principal_id)
            .await?
            .is_some_and(|profile| profile.enabled))
    }
}
