//! Continuous-refill token bucket.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::category::RateCategory;

/// Outcome of one consumption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Whole tokens left after this attempt.
    pub remaining: u32,
    /// Seconds until one token is available; zero when allowed.
    pub retry_after_seconds: u64,
}

/// Bucket state. Transitions return a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBucket {
    /// Maximum tokens.
    pub capacity: f64,
    /// Tokens currently available.
    pub tokens: f64,
    /// Tokens added per minute.
    pub refill_per_minute: f64,
    /// When `tokens` was last brought up to date.
    pub last_refill: DateTime<Utc>,
}

impl TokenBucket {
    /// A full bucket for `category`.
    pub fn full(category: RateCategory, now: DateTime<Utc>) -> Self {
        let capacity = f64::from(category.capacity());
        Self {
            capacity,
            tokens: capacity,
            refill_per_minute: f64::from(category.refill_per_minute()),
            last_refill: now,
        }
    }

    /// The bucket with tokens accrued up to `now`.
    pub fn refilled(&self, now: DateTime<Utc>) -> Self {
        let elapsed_ms = (now - self.last_refill).num_milliseconds();
        if elapsed_ms <= 0 {
            return *self;
        }
        let accrued = elapsed_ms as f64 * self.refill_per_minute / 60_000.0;
        Self {
            tokens: (self.tokens + accrued).min(self.capacity),
            last_refill: now,
            ..*self
        }
    }

    /// Attempts to take one token at `now`.
    pub fn try_take(&self, now: DateTime<Utc>) -> (Self, RateDecision) {
        let current = self.refilled(now);

        if current.tokens >= 1.0 {
            let next = Self {
                tokens: current.tokens - 1.0,
                ..current
            };
            let decision = RateDecision {
                allowed: true,
                remaining: next.tokens.floor() as u32,
                retry_after_seconds: 0,
            };
            return (next, decision);
        }

        let missing = 1.0 - current.tokens;
        let wait = (missing * 60.0 / current.refill_per_minute).ceil().max(1.0);
        let decision = RateDecision {
            allowed: false,
            remaining: 0,
            retry_after_seconds: wait as u64,
        };
        (current, decision)
    }
}
