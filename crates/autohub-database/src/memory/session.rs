//! In-memory session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use autohub_core::result::AppResult;
use autohub_entity::session::Session;

use crate::store::SessionStore;

/// Session store over a concurrent map.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, valid or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn collect_for(&self, principal_id: Uuid, keep: impl Fn(&Session) -> bool) -> Vec<Session> {
        let mut found: Vec<Session> = self
            .sessions
            .iter()
            .filter(|entry| entry.principal_id == principal_id && keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }
}

/// Ids of the sessions in `snapshot` that a sweep at `now` removes.
pub fn sweepable_ids<'a>(
    snapshot: impl IntoIterator<Item = &'a Session>,
    now: DateTime<Utc>,
) -> Vec<Uuid> {
    snapshot
        .into_iter()
        .filter(|session| session.is_sweepable_at(now))
        .map(|session| session.id)
        .collect()
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &Session) -> AppResult<Session> {
        self.sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.sessions.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        Ok(self.collect_for(principal_id, |s| s.is_valid_at(now)))
    }

    async fn find_all_by_principal(&self, principal_id: Uuid) -> AppResult<Vec<Session>> {
        Ok(self.collect_for(principal_id, |_| true))
    }

    async fn touch(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        let Some(mut entry) = self.sessions.get_mut(&id) else {
            return Ok(None);
        };
        let touched = entry.touched(now);
        *entry = touched.clone();
        Ok(Some(touched))
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let Some(mut entry) = self.sessions.get_mut(&id) else {
            return Ok(false);
        };
        let terminated = entry.terminated();
        *entry = terminated;
        Ok(true)
    }

    async fn deactivate_all(&self, principal_id: Uuid, except: Option<Uuid>) -> AppResult<u64> {
        let mut count = 0;
        for mut entry in self.sessions.iter_mut() {
            if entry.principal_id != principal_id || !entry.active || Some(entry.id) == except {
                continue;
            }
            let terminated = entry.terminated();
            *entry = terminated;
            count += 1;
        }
        Ok(count)
    }

    async fn delete_sweepable(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let snapshot: Vec<Session> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut removed = 0;
        for id in sweepable_ids(&snapshot, now) {
            // Re-check under the shard lock; a session that changed since the
            // snapshot is only removed if it is still sweepable.
            if self
                .sessions
                .remove_if(&id, |_, session| session.is_sweepable_at(now))
                .is_some()
            {
                removed += 1;
            }
        }

        debug!(removed, remaining = self.sessions.len(), "Swept in-memory sessions");
        Ok(removed)
    }
}
