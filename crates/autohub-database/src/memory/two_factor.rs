//! In-memory two-factor profile store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use autohub_core::result::AppResult;
use autohub_entity::two_factor::{TwoFactorProfile, TwoFactorState};

use crate::store::TwoFactorStore;

/// Two-factor profile store over a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryTwoFactorStore {
    profiles: DashMap<Uuid, TwoFactorProfile>,
}

impl MemoryTwoFactorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TwoFactorStore for MemoryTwoFactorStore {
    async fn find(&self, principal_id: Uuid) -> AppResult<Option<TwoFactorProfile>> {
        Ok(self
            .profiles
            .get(&principal_id)
            .map(|entry| entry.value().clone()))
    }

    async fn stage(
        &self,
        principal_id: Uuid,
        secret: &str,
        backup_codes: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut entry = self
            .profiles
            .entry(principal_id)
            .or_insert_with(|| TwoFactorProfile::unset(principal_id, now));
        let staged = entry.staged(secret.to_string(), backup_codes.to_vec(), now);
        *entry = staged;
        Ok(())
    }

    async fn promote_pending(
        &self,
        principal_id: Uuid,
        expected_secret: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(mut entry) = self.profiles.get_mut(&principal_id) else {
            return Ok(false);
        };
        if !entry.is_staged(expected_secret) {
            return Ok(false);
        }
        match entry.confirmed(now) {
            Some(confirmed) => {
                *entry = confirmed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn disable(&self, principal_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let Some(mut entry) = self.profiles.get_mut(&principal_id) else {
            return Ok(false);
        };
        if entry.state() == TwoFactorState::Disabled {
            return Ok(false);
        }
        let disabled = entry.disabled(now);
        *entry = disabled;
        Ok(true)
    }

    async fn consume_backup_code(
        &self,
        principal_id: Uuid,
        digest: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(mut entry) = self.profiles.get_mut(&principal_id) else {
            return Ok(false);
        };
        if !entry.enabled {
            return Ok(false);
        }
        match entry.without_backup_code(digest, now) {
            Some(updated) => {
                *entry = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
