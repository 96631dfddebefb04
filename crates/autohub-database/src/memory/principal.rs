//! In-memory principal store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use autohub_core::error::AppError;
use autohub_core::result::AppResult;
use autohub_entity::principal::{LockoutState, Principal, PrincipalStatus};

use crate::store::PrincipalStore;

/// Principal store over concurrent maps, indexed by id and by lowercase
/// identifier.
#[derive(Debug, Default)]
pub struct MemoryPrincipalStore {
    principals: DashMap<Uuid, Principal>,
    identifiers: DashMap<String, Uuid>,
}

impl MemoryPrincipalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, identifier: &str) -> Option<Uuid> {
        self.identifiers
            .get(&identifier.to_lowercase())
            .map(|entry| *entry.value())
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn insert(&self, principal: &Principal) -> AppResult<Principal> {
        match self.identifiers.entry(principal.identifier.to_lowercase()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(format!(
                    "Identifier '{}' is already registered",
                    principal.identifier
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(principal.id);
            }
        }
        self.principals.insert(principal.id, principal.clone());
        Ok(principal.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        Ok(self.principals.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Principal>> {
        let Some(id) = self.resolve(identifier) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn record_failed_attempt(
        &self,
        identifier: &str,
        threshold: u32,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LockoutState>> {
        let Some(id) = self.resolve(identifier) else {
            return Ok(None);
        };
        let Some(mut entry) = self.principals.get_mut(&id) else {
            return Ok(None);
        };
        let next = entry.lockout().after_failure(threshold, cooldown, now);
        let updated = entry.with_lockout(next);
        *entry = updated;
        Ok(Some(next))
    }

    async fn record_successful_login(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(id) = self.resolve(identifier) else {
            return Ok(false);
        };
        let Some(mut entry) = self.principals.get_mut(&id) else {
            return Ok(false);
        };
        let updated = entry.after_successful_login(now);
        *entry = updated;
        Ok(true)
    }

    async fn update_status(&self, id: Uuid, status: PrincipalStatus) -> AppResult<bool> {
        let Some(mut entry) = self.principals.get_mut(&id) else {
            return Ok(false);
        };
        let updated = entry.with_status(status);
        *entry = updated;
        Ok(true)
    }
}
