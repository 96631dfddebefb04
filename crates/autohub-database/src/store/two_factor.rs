//! Two-factor profile storage interface.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use autohub_core::result::AppResult;
use autohub_entity::two_factor::TwoFactorProfile;

/// Persistent store for [`TwoFactorProfile`] records.
#[async_trait]
pub trait TwoFactorStore: Send + Sync + fmt::Debug + 'static {
    /// Point lookup by principal id.
    async fn find(&self, principal_id: Uuid) -> AppResult<Option<TwoFactorProfile>>;

    /// Stage a secret and its backup-code digests, creating the profile if
    /// needed.
    ///
    /// Only the staged columns change; the active secret, the remaining
    /// backup codes and the enabled flag are left as they are.
    async fn stage(
        &self,
        principal_id: Uuid,
        secret: &str,
        backup_codes: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Promote the staged enrollment to the active one, provided the staged
    /// secret is still `expected_secret`.
    ///
    /// Returns `false` when nothing, or a different secret, is staged.
    async fn promote_pending(
        &self,
        principal_id: Uuid,
        expected_secret: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Clear the secret, the backup codes and any staged enrollment.
    ///
    /// Returns `true` when the profile was not already disabled.
    async fn disable(&self, principal_id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Atomically remove one backup-code digest from an enabled profile.
    ///
    /// Returns `true` only for the caller that actually removed it, so a code
    /// presented concurrently twice is accepted once.
    async fn consume_backup_code(
        &self,
        principal_id: Uuid,
        digest: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}
