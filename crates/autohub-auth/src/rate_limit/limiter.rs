//! Rate limiter over a shared bucket map.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use autohub_core::traits::Clock;

use super::bucket::{RateDecision, TokenBucket};
use super::category::RateCategory;

/// Buckets keyed by client address and category, created lazily.
#[derive(Debug, Default)]
pub struct RateBuckets {
    buckets: DashMap<(String, RateCategory), TokenBucket>,
}

impl RateBuckets {
    /// Creates an empty bucket map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no bucket exists yet.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Gates requests per client address and endpoint category.
#[derive(Clone)]
pub struct RateLimiter {
    /// Bucket state.
    buckets: Arc<RateBuckets>,
    /// Time source for refills.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

impl RateLimiter {
    /// Creates a limiter over the given buckets.
    pub fn new(buckets: Arc<RateBuckets>, clock: Arc<dyn Clock>) -> Self {
        Self { buckets, clock }
    }

    /// Takes one token from the `(client_ip, category)` bucket.
    ///
    /// The read-refill-take sequence runs under the bucket's map entry, so
    /// concurrent requests from one client never share a token.
    pub fn try_consume(&self, client_ip: &str, category: RateCategory) -> RateDecision {
        let now = self.clock.now();
        let mut bucket = self
            .buckets
            .buckets
            .entry((client_ip.to_string(), category))
            .or_insert_with(|| TokenBucket::full(category, now));

        let (next, decision) = bucket.try_take(now);
        *bucket = next;

        if !decision.allowed {
            warn!(
                client_ip = %client_ip,
                category = %category,
                retry_after_seconds = decision.retry_after_seconds,
                "Rate limit exceeded"
            );
        }
        decision
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Drops every bucket.
    pub fn reset_all(&self) {
        let count = self.buckets.len();
        self.buckets.buckets.clear();
        debug!(count = count, "Rate limit buckets reset");
    }
}
