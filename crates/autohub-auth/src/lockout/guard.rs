//! Per-identifier failed-login counting and account locks.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use autohub_core::config::lockout::LockoutConfig;
use autohub_core::result::AppResult;
use autohub_core::traits::Clock;
use autohub_database::store::PrincipalStore;
use autohub_entity::principal::LockoutState;

/// Whether an identifier may attempt a login right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LockStatus {
    /// Unknown, or known and not locked.
    Unlocked,
    /// Locked until the given instant; `None` for a banned account.
    Locked {
        /// When the lock lifts.
        until: Option<DateTime<Utc>>,
    },
}

impl LockStatus {
    /// Whether this status blocks a login.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

/// Applies the failed-login lockout policy.
///
/// Counters are kept per login identifier, regardless of the source address.
/// Callers consult [`status`](Self::status) before verifying credentials and
/// record the outcome strictly afterwards.
#[derive(Clone)]
pub struct LockoutGuard {
    /// Principal and counter persistence.
    store: Arc<dyn PrincipalStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Failures that trigger a lock.
    threshold: u32,
    /// Lock duration.
    cooldown: Duration,
}

impl std::fmt::Debug for LockoutGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockoutGuard")
            .field("threshold", &self.threshold)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

impl LockoutGuard {
    /// Creates a guard from the lockout configuration.
    pub fn new(config: &LockoutConfig, store: Arc<dyn PrincipalStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            threshold: config.max_failed_attempts,
            cooldown: Duration::minutes(config.lockout_duration_minutes as i64),
        }
    }

    /// Current lock status of an identifier.
    pub async fn status(&self, identifier: &str) -> AppResult<LockStatus> {
        let Some(principal) = self.store.find_by_identifier(identifier).await? else {
            return Ok(LockStatus::Unlocked);
        };
        let now = self.clock.now();

        if principal.status.is_banned() {
            return Ok(LockStatus::Locked { until: None });
        }
        if principal.lockout().is_locked_at(now) {
            return Ok(LockStatus::Locked {
                until: principal.locked_until,
            });
        }
        Ok(LockStatus::Unlocked)
    }

    /// Whether the identifier is currently locked or banned.
    pub async fn is_locked(&self, identifier: &str) -> AppResult<bool> {
        Ok(self.status(identifier).await?.is_locked())
    }

    /// Records a failed attempt and returns whether the identifier is now locked.
    ///
    /// Unknown identifiers are ignored and report `false`.
    pub async fn record_failure(&self, identifier: &str) -> AppResult<bool> {
        let now = self.clock.now();
        Ok(self
            .register_failure(identifier)
            .await?
            .is_some_and(|state| state.is_locked_at(now)))
    }

    /// Records a failed attempt and returns the resulting state, if the
    /// identifier is known.
    pub async fn register_failure(&self, identifier: &str) -> AppResult<Option<LockoutState>> {
        let now = self.clock.now();
        let state = self
            .store
            .record_failed_attempt(identifier, self.threshold, self.cooldown, now)
            .await?;

        if let Some(state) = &state {
            if state.is_locked_at(now) && state.reached(self.threshold) {
                warn!(
                    failed_attempts = state.failed_attempts,
                    locked_until = ?state.locked_until,
                    "Account locked after repeated failed logins"
                );
            }
        }
        Ok(state)
    }

    /// Clears the counter and any lock after a successful authentication.
    pub async fn record_success(&self, identifier: &str) -> AppResult<()> {
        let found = self
            .store
            .record_successful_login(identifier, self.clock.now())
            .await?;
        if found {
            info!("Failed-login counter reset");
        }
        Ok(())
    }
}
