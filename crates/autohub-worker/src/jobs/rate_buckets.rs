//! Periodic rate-bucket reset.

use std::time::Duration;

use async_trait::async_trait;

use autohub_auth::RateLimiter;

use crate::job::{SweepError, SweepJob};

/// Clears every rate bucket, bounding the memory held by idle clients.
#[derive(Debug)]
pub struct RateBucketResetJob {
    /// Limiter owning the buckets
    limiter: RateLimiter,
    /// Time between resets
    interval: Duration,
}

impl RateBucketResetJob {
    /// Create the job
    pub fn new(limiter: RateLimiter, interval: Duration) -> Self {
        Self { limiter, interval }
    }
}

#[async_trait]
impl SweepJob for RateBucketResetJob {
    fn name(&self) -> &str {
        "rate_bucket_reset"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<u64, SweepError> {
        let count = self.limiter.bucket_count() as u64;
        self.limiter.reset_all();
        Ok(count)
    }
}
