//! Session registry: create, touch, terminate and sweep.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use autohub_core::config::session::SessionConfig;
use autohub_core::result::AppResult;
use autohub_core::traits::Clock;
use autohub_database::store::SessionStore;
use autohub_entity::session::{DeviceType, NewSession, Session};

/// Tracks sessions of authenticated principals.
///
/// A session is valid while it is active and its fixed expiry is in the
/// future. Activity never extends the expiry.
#[derive(Clone)]
pub struct SessionRegistry {
    /// Session persistence.
    store: Arc<dyn SessionStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Absolute lifetime of a session.
    ttl: Duration,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionRegistry {
    /// Creates a registry over the given store.
    pub fn new(config: &SessionConfig, store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::hours(config.expiry_hours as i64),
        }
    }

    /// Opens a session with an explicit device classification.
    pub async fn create(
        &self,
        principal_id: Uuid,
        ip_address: &str,
        user_agent: Option<&str>,
        device_info: DeviceType,
    ) -> AppResult<Session> {
        let data = NewSession {
            principal_id,
            ip_address: ip_address.to_string(),
            user_agent: user_agent.map(str::to_string),
            device_info,
        };
        let session = self
            .store
            .insert(&Session::open(data, self.clock.now(), self.ttl))
            .await?;

        info!(
            session_id = %session.id,
            principal_id = %principal_id,
            device = %session.device_info,
            "Session created"
        );
        Ok(session)
    }

    /// Opens a session, classifying the device from the user agent.
    pub async fn open_for_client(
        &self,
        principal_id: Uuid,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> AppResult<Session> {
        self.create(
            principal_id,
            ip_address,
            user_agent,
            DeviceType::classify(user_agent),
        )
        .await
    }

    /// Touches the principal's newest valid session from the same client, or
    /// opens one when none matches.
    pub async fn resume_or_open(
        &self,
        principal_id: Uuid,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> AppResult<Session> {
        let existing = self
            .find_active_sessions(principal_id)
            .await?
            .into_iter()
            .find(|session| {
                session.ip_address == ip_address && session.user_agent.as_deref() == user_agent
            });

        if let Some(session) = existing
            && let Some(touched) = self.touch(session.id).await?
        {
            return Ok(touched);
        }
        self.open_for_client(principal_id, ip_address, user_agent).await
    }

    /// Records activity on a session. Never extends its expiry.
    pub async fn touch(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        self.store.touch(session_id, self.clock.now()).await
    }

    /// Ends a session. Idempotent; returns whether the session exists.
    pub async fn terminate(&self, session_id: Uuid) -> AppResult<bool> {
        let found = self.store.deactivate(session_id).await?;
        if found {
            info!(session_id = %session_id, "Session terminated");
        }
        Ok(found)
    }

    /// Ends every session of a principal.
    pub async fn terminate_all(&self, principal_id: Uuid) -> AppResult<u64> {
        let count = self.store.deactivate_all(principal_id, None).await?;
        info!(principal_id = %principal_id, count = count, "Terminated all sessions");
        Ok(count)
    }

    /// Ends every session of a principal except `keep`.
    pub async fn terminate_all_except(&self, principal_id: Uuid, keep: Uuid) -> AppResult<u64> {
        let count = self.store.deactivate_all(principal_id, Some(keep)).await?;
        info!(
            principal_id = %principal_id,
            kept = %keep,
            count = count,
            "Terminated other sessions"
        );
        Ok(count)
    }

    /// Removes expired and terminated sessions. Returns the number removed.
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        let removed = self.store.delete_sweepable(self.clock.now()).await?;
        debug!(removed = removed, "Session sweep completed");
        Ok(removed)
    }

    /// Point lookup, valid or not.
    pub async fn find(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        self.store.find_by_id(session_id).await
    }

    /// Valid sessions of a principal, newest first.
    pub async fn find_active_sessions(&self, principal_id: Uuid) -> AppResult<Vec<Session>> {
        self.store
            .find_active_by_principal(principal_id, self.clock.now())
            .await
    }

    /// Whether the session exists and is valid now.
    pub async fn is_valid(&self, session_id: Uuid) -> AppResult<bool> {
        let now = self.clock.now();
        Ok(self
            .store
            .find_by_id(session_id)
            .await?
            .is_some_and(|session| session.is_valid_at(now)))
    }
}
