//! Sweep runner: one ticker task per job, stopped by a shared signal.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing;

use crate::job::SweepJob;

/// Drives registered sweep jobs on their own intervals.
#[derive(Debug, Default)]
pub struct SweepRunner {
    /// Registered jobs
    jobs: Vec<Arc<dyn SweepJob>>,
}

impl SweepRunner {
    /// Create an empty runner
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job
    pub fn register(&mut self, job: Arc<dyn SweepJob>) {
        tracing::info!(
            job = job.name(),
            interval_seconds = job.interval().as_secs(),
            "Registered sweep job"
        );
        self.jobs.push(job);
    }

    /// Names of the registered jobs
    pub fn job_names(&self) -> Vec<String> {
        self.jobs.iter().map(|job| job.name().to_string()).collect()
    }

    /// Spawn one task per job. Each task runs until `cancel` turns `true`
    /// or its sender is dropped.
    pub fn spawn(&self, cancel: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        self.jobs
            .iter()
            .map(|job| tokio::spawn(run_job(Arc::clone(job), cancel.clone())))
            .collect()
    }

    /// Run every job once, in registration order
    pub async fn run_all_once(&self) {
        for job in &self.jobs {
            run_once(job.as_ref()).await;
        }
    }
}

/// Ticker loop of a single job. The first run happens one interval after start.
async fn run_job(job: Arc<dyn SweepJob>, mut cancel: watch::Receiver<bool>) {
    let period = job.interval();
    if period.is_zero() {
        tracing::error!(job = job.name(), "Sweep interval is zero; task not started");
        return;
    }
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(job = job.name(), "Sweep task started");

    loop {
        tokio::select! {
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    tracing::info!(job = job.name(), "Sweep task received shutdown signal");
                    break;
                }
            }
            _ = ticker.tick() => {
                run_once(job.as_ref()).await;
            }
        }
    }
}

async fn run_once(job: &dyn SweepJob) {
    match job.run().await {
        Ok(0) => tracing::trace!(job = job.name(), "Sweep found nothing to remove"),
        Ok(removed) => tracing::info!(job = job.name(), removed = removed, "Sweep completed"),
        Err(e) => tracing::error!(job = job.name(), error = %e, "Sweep failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use autohub_core::error::AppError;

    use crate::job::SweepError;

    #[derive(Debug, Default)]
    struct CountingJob {
        runs: AtomicU64,
        fail: bool,
    }

    #[async_trait]
    impl SweepJob for CountingJob {
        fn name(&self) -> &str {
            "counting"
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(10)
        }

        async fn run(&self) -> Result<u64, SweepError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::database("store unavailable").into());
            }
            Ok(1)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_tick_until_cancelled() {
        let job = Arc::new(CountingJob::default());
        let mut runner = SweepRunner::new();
        runner.register(job.clone());

        let (tx, rx) = watch::channel(false);
        let handles = runner.spawn(rx);

        time::sleep(Duration::from_secs(35)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);

        tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_job_keeps_ticking() {
        let job = Arc::new(CountingJob {
            runs: AtomicU64::new(0),
            fail: true,
        });
        let mut runner = SweepRunner::new();
        runner.register(job.clone());

        let (tx, rx) = watch::channel(false);
        let handles = runner.spawn(rx);

        time::sleep(Duration::from_secs(25)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 2);

        drop(tx);
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[derive(Debug, Default)]
    struct ZeroIntervalJob {
        runs: AtomicU64,
    }

    #[async_trait]
    impl SweepJob for ZeroIntervalJob {
        fn name(&self) -> &str {
            "zero-interval"
        }

        fn interval(&self) -> Duration {
            Duration::ZERO
        }

        async fn run(&self) -> Result<u64, SweepError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_job_is_skipped_without_panicking() {
        let job = Arc::new(ZeroIntervalJob::default());
        let mut runner = SweepRunner::new();
        runner.register(job.clone());

        let (_tx, rx) = watch::channel(false);
        for handle in runner.spawn(rx) {
            assert!(handle.await.is_ok());
        }
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_all_once() {
        let job = Arc::new(CountingJob::default());
        let mut runner = SweepRunner::new();
        runner.register(job.clone());

        runner.run_all_once().await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
        assert_eq!(runner.job_names(), vec!["counting".to_string()]);
    }
}
