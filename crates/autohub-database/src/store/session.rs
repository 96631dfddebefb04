//! Session storage interface.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use autohub_core::result::AppResult;
use autohub_entity::session::Session;

/// Persistent store for [`Session`] records.
#[async_trait]
pub trait SessionStore: Send + Sync + fmt::Debug + 'static {
    /// Persist a newly opened session.
    async fn insert(&self, session: &Session) -> AppResult<Session>;

    /// Point lookup by session id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Sessions of a principal that are still valid at `now`, newest first.
    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>>;

    /// Every stored session of a principal, newest first.
    async fn find_all_by_principal(&self, principal_id: Uuid) -> AppResult<Vec<Session>>;

    /// Set `last_active_at` and return the refreshed record.
    async fn touch(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Session>>;

    /// Clear the `active` flag. Returns whether the session exists.
    async fn deactivate(&self, id: Uuid) -> AppResult<bool>;

    /// Deactivate every active session of a principal, optionally sparing one.
    /// Returns the number of sessions deactivated.
    async fn deactivate_all(&self, principal_id: Uuid, except: Option<Uuid>) -> AppResult<u64>;

    /// Remove sessions that are inactive or expired before `now`.
    async fn delete_sweepable(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
