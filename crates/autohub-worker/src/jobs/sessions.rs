//! Expired and terminated session removal.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use autohub_auth::SessionRegistry;

use crate::job::{SweepError, SweepJob};

/// Removes sessions that are terminated or past their expiry.
#[derive(Debug)]
pub struct SessionSweepJob {
    /// Session registry
    sessions: Arc<SessionRegistry>,
    /// Time between sweeps
    interval: Duration,
}

impl SessionSweepJob {
    /// Create the job
    pub fn new(sessions: Arc<SessionRegistry>, interval: Duration) -> Self {
        Self { sessions, interval }
    }
}

#[async_trait]
impl SweepJob for SessionSweepJob {
    fn name(&self) -> &str {
        "session_sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<u64, SweepError> {
        Ok(self.sessions.sweep_expired().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autohub_core::config::session::SessionConfig;
    use autohub_core::traits::ManualClock;
    use autohub_database::MemorySessionStore;
    use autohub_entity::session::DeviceType;

    #[tokio::test]
    async fn test_run_removes_terminated_sessions() {
        let registry = Arc::new(SessionRegistry::new(
            &SessionConfig::default(),
            Arc::new(MemorySessionStore::new()),
            Arc::new(ManualClock::starting_now()),
        ));
        let session = registry
            .create(uuid::Uuid::new_v4(), "10.0.0.1", None, DeviceType::Unknown)
            .await
            .unwrap();
        registry.terminate(session.id).await.unwrap();

        let job = SessionSweepJob::new(registry.clone(), Duration::from_secs(60));
        assert_eq!(job.run().await.unwrap(), 1);
        assert!(registry.find(session.id).await.unwrap().is_none());
    }
}
