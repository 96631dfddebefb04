//! Principal and lockout storage interface.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use autohub_core::result::AppResult;
use autohub_entity::principal::{LockoutState, Principal, PrincipalStatus};

/// Persistent store for [`Principal`] records and their lockout state.
#[async_trait]
pub trait PrincipalStore: Send + Sync + fmt::Debug + 'static {
    /// Persist a new principal. Fails with a conflict on a duplicate identifier.
    async fn insert(&self, principal: &Principal) -> AppResult<Principal>;

    /// Point lookup by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>>;

    /// Case-insensitive lookup by login identifier.
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Principal>>;

    /// Atomically increment the failed-attempt counter and, when the new count
    /// reaches `threshold`, set the lock to expire at `now + cooldown`.
    ///
    /// Returns the resulting state, or `None` for an unknown identifier.
    async fn record_failed_attempt(
        &self,
        identifier: &str,
        threshold: u32,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LockoutState>>;

    /// Reset the counter, clear the lock and stamp the login time.
    /// Returns whether the identifier exists.
    async fn record_successful_login(&self, identifier: &str, now: DateTime<Utc>)
    -> AppResult<bool>;

    /// Change the account status. Returns whether the principal exists.
    async fn update_status(&self, id: Uuid, status: PrincipalStatus) -> AppResult<bool>;
}
