//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use autohub_core::error::{AppError, ErrorKind};
use autohub_core::result::AppResult;
use autohub_entity::session::Session;

use crate::store::SessionStore;

/// Repository for session lifecycle persistence.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn insert(&self, session: &Session) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (id, principal_id, ip_address, user_agent, device_info,
                                     created_at, last_active_at, expires_at, active)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(session.id)
        .bind(session.principal_id)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.device_info)
        .bind(session.created_at)
        .bind(session.last_active_at)
        .bind(session.expires_at)
        .bind(session.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            r#"SELECT * FROM sessions
               WHERE principal_id = $1 AND active = TRUE AND expires_at > $2
               ORDER BY created_at DESC"#,
        )
        .bind(principal_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find active sessions", e)
        })
    }

    async fn find_all_by_principal(&self, principal_id: Uuid) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE principal_id = $1 ORDER BY created_at DESC",
        )
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find sessions", e))
    }

    async fn touch(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        // Last writer wins on last_active_at.
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET last_active_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch session", e))
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE sessions SET active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to terminate session", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_all(&self, principal_id: Uuid, except: Option<Uuid>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"UPDATE sessions SET active = FALSE
               WHERE principal_id = $1 AND active = TRUE
                 AND ($2::uuid IS NULL OR id <> $2)"#,
        )
        .bind(principal_id)
        .bind(except)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to terminate sessions", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn delete_sweepable(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1 OR active = FALSE")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to sweep sessions", e)
            })?;
        Ok(result.rows_affected())
    }
}
