//! Two-factor profile repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use autohub_core::error::{AppError, ErrorKind};
use autohub_core::result::AppResult;
use autohub_entity::two_factor::TwoFactorProfile;

use crate::store::TwoFactorStore;

/// Repository for two-factor profiles.
#[derive(Debug, Clone)]
pub struct TwoFactorRepository {
    pool: PgPool,
}

impl TwoFactorRepository {
    /// Create a new two-factor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TwoFactorStore for TwoFactorRepository {
    async fn find(&self, principal_id: Uuid) -> AppResult<Option<TwoFactorProfile>> {
        sqlx::query_as::<_, TwoFactorProfile>(
            "SELECT * FROM two_factor_profiles WHERE principal_id = $1",
        )
        .bind(principal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find two-factor profile", e)
        })
    }

    async fn stage(
        &self,
        principal_id: Uuid,
        secret: &str,
        backup_codes: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"INSERT INTO two_factor_profiles (principal_id, pending_secret,
                                                pending_backup_codes, updated_at)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (principal_id) DO UPDATE SET
                   pending_secret = EXCLUDED.pending_secret,
                   pending_backup_codes = EXCLUDED.pending_backup_codes,
                   updated_at = EXCLUDED.updated_at"#,
        )
        .bind(principal_id)
        .bind(secret)
        .bind(backup_codes)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to stage two-factor secret", e)
        })?;
        Ok(())
    }

    async fn promote_pending(
        &self,
        principal_id: Uuid,
        expected_secret: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        // Right-hand sides read the row as it was before the update.
        let result = sqlx::query(
            r#"UPDATE two_factor_profiles
               SET enabled = TRUE,
                   secret = pending_secret,
                   backup_codes = pending_backup_codes,
                   pending_secret = NULL,
                   pending_backup_codes = '{}',
                   disabled_at = NULL,
                   updated_at = $3
               WHERE principal_id = $1 AND pending_secret = $2"#,
        )
        .bind(principal_id)
        .bind(expected_secret)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to enable two-factor", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn disable(&self, principal_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE two_factor_profiles
               SET enabled = FALSE,
                   secret = NULL,
                   backup_codes = '{}',
                   pending_secret = NULL,
                   pending_backup_codes = '{}',
                   disabled_at = $2,
                   updated_at = $2
               WHERE principal_id = $1
                 AND (enabled OR pending_secret IS NOT NULL OR disabled_at IS NULL)"#,
        )
        .bind(principal_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to disable two-factor", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn consume_backup_code(
        &self,
        principal_id: Uuid,
        digest: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        // The membership check and the removal are one statement; of two
        // concurrent presentations only one matches the WHERE clause.
        let result = sqlx::query(
            r#"UPDATE two_factor_profiles
               SET backup_codes = array_remove(backup_codes, $2), updated_at = $3
               WHERE principal_id = $1 AND enabled = TRUE AND $2 = ANY(backup_codes)"#,
        )
        .bind(principal_id)
        .bind(digest)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume backup code", e)
        })?;
        Ok(result.rows_affected() > 0)
    }
}
