//! Sweep job trait.

use std::time::Duration;

use async_trait::async_trait;

use autohub_core::error::AppError;

/// A periodic housekeeping task.
#[async_trait]
pub trait SweepJob: Send + Sync + std::fmt::Debug {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Time between runs.
    fn interval(&self) -> Duration;

    /// Runs once and returns the number of items removed or reset.
    async fn run(&self) -> Result<u64, SweepError>;
}

/// Error from one sweep run. The runner logs it and waits for the next tick.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Failure of the underlying store or component
    #[error("Sweep failed: {0}")]
    Internal(#[from] AppError),
}
