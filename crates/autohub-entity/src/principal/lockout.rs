//! Failed-login lockout state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Failed-attempt counter and lock expiry for one principal.
///
/// Transitions return a new value. The persisted form of this state is
/// updated with an atomic increment at the storage layer; the pure
/// transitions here define the semantics that update must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockoutState {
    /// Consecutive failed attempts since the last success.
    pub failed_attempts: u32,
    /// Lock expiry, when a lock has been applied.
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// A state with no failures and no lock.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Whether a lock is in force at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// The state after one more failed attempt.
    ///
    /// Once the count reaches `threshold` the lock is (re)applied for
    /// `cooldown` starting at `now`.
    pub fn after_failure(&self, threshold: u32, cooldown: Duration, now: DateTime<Utc>) -> Self {
        let failed_attempts = self.failed_attempts.saturating_add(1);
        let locked_until = if failed_attempts >= threshold {
            Some(now + cooldown)
        } else {
            self.locked_until
        };
        Self {
            failed_attempts,
            locked_until,
        }
    }

    /// Whether the counter has reached the lock threshold.
    pub fn reached(&self, threshold: u32) -> bool {
        self.failed_attempts >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locks_on_threshold() {
        let now = Utc::now();
        let cooldown = Duration::minutes(30);
        let mut state = LockoutState::cleared();

        for _ in 0..4 {
            state = state.after_failure(5, cooldown, now);
            assert!(!state.is_locked_at(now));
        }

        let locked = state.after_failure(5, cooldown, now);
        assert_eq!(locked.failed_attempts, 5);
        assert!(locked.reached(5));
        assert_eq!(locked.locked_until, Some(now + cooldown));
        assert!(locked.is_locked_at(now));
        assert!(!locked.is_locked_at(now + cooldown));
    }

    #[test]
    fn test_transition_leaves_previous_value_untouched() {
        let now = Utc::now();
        let before = LockoutState::cleared();
        let after = before.after_failure(1, Duration::minutes(1), now);

        assert_eq!(before, LockoutState::cleared());
        assert!(after.is_locked_at(now));
    }

    #[test]
    fn test_failure_after_expired_lock_relocks() {
        let now = Utc::now();
        let cooldown = Duration::minutes(30);
        let expired = LockoutState {
            failed_attempts: 5,
            locked_until: Some(now - Duration::minutes(1)),
        };

        let next = expired.after_failure(5, cooldown, now);
        assert_eq!(next.failed_attempts, 6);
        assert!(next.is_locked_at(now));
    }
}
