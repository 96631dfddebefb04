//! Principal repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use autohub_core::error::{AppError, ErrorKind};
use autohub_core::result::AppResult;
use autohub_entity::principal::{LockoutState, Principal, PrincipalStatus};

use crate::store::PrincipalStore;

/// Repository for principal records and lockout counters.
#[derive(Debug, Clone)]
pub struct PrincipalRepository {
    pool: PgPool,
}

impl PrincipalRepository {
    /// Create a new principal repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PrincipalRepository {
    async fn insert(&self, principal: &Principal) -> AppResult<Principal> {
        sqlx::query_as::<_, Principal>(
            r#"INSERT INTO principals (id, identifier, password_hash, status,
                                       failed_login_attempts, locked_until, created_at, last_login_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(principal.id)
        .bind(&principal.identifier)
        .bind(&principal.password_hash)
        .bind(principal.status)
        .bind(principal.failed_login_attempts)
        .bind(principal.locked_until)
        .bind(principal.created_at)
        .bind(principal.last_login_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate =
                matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                AppError::with_source(
                    ErrorKind::Conflict,
                    format!("Identifier '{}' is already registered", principal.identifier),
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create principal", e)
            }
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find principal by id", e)
            })
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>(
            "SELECT * FROM principals WHERE LOWER(identifier) = LOWER($1)",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find principal by identifier",
                e,
            )
        })
    }

    async fn record_failed_attempt(
        &self,
        identifier: &str,
        threshold: u32,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LockoutState>> {
        // Increment and threshold comparison happen in one statement, so
        // concurrent failures cannot lose an increment or skip the lock.
        let row = sqlx::query_as::<_, (i32, Option<DateTime<Utc>>)>(
            r#"UPDATE principals
               SET failed_login_attempts = failed_login_attempts + 1,
                   locked_until = CASE
                       WHEN failed_login_attempts + 1 >= $2 THEN $3
                       ELSE locked_until
                   END
               WHERE LOWER(identifier) = LOWER($1)
               RETURNING failed_login_attempts, locked_until"#,
        )
        .bind(identifier)
        .bind(i32::try_from(threshold).unwrap_or(i32::MAX))
        .bind(now + cooldown)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record failed login", e)
        })?;

        Ok(row.map(|(attempts, locked_until)| LockoutState {
            failed_attempts: u32::try_from(attempts).unwrap_or(0),
            locked_until,
        }))
    }

    async fn record_successful_login(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE principals
               SET failed_login_attempts = 0, locked_until = NULL, last_login_at = $2
               WHERE LOWER(identifier) = LOWER($1)"#,
        )
        .bind(identifier)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record successful login", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_status(&self, id: Uuid, status: PrincipalStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE principals SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update principal status", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
