//! Verification-cache sweep.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use autohub_auth::TokenAuthority;

use crate::job::{SweepError, SweepJob};

/// Drops cached verifications of expired tokens.
#[derive(Debug)]
pub struct TokenCacheSweepJob {
    /// Owner of the cache
    tokens: Arc<TokenAuthority>,
    /// Time between sweeps
    interval: Duration,
}

impl TokenCacheSweepJob {
    /// Create the job
    pub fn new(tokens: Arc<TokenAuthority>, interval: Duration) -> Self {
        Self { tokens, interval }
    }
}

#[async_trait]
impl SweepJob for TokenCacheSweepJob {
    fn name(&self) -> &str {
        "token_cache_sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<u64, SweepError> {
        Ok(self.tokens.sweep_expired() as u64)
    }
}
