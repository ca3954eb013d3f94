//! Parallel candidate executor using Rayon.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::backtest::walkforward::Cancellation;
use crate::error::{EngineError, SimulationError};

use super::config::ParallelConfig;
use super::progress::ProgressTracker;
use super::result::{CandidateOutcome, GridRun};
use super::types::Parameters;

/// Evaluates parameter candidates on a Rayon pool.
///
/// Outcomes are always returned in candidate order, whatever order the
/// workers finish in.
#[derive(Debug)]
pub struct GridExecutor {
    config: ParallelConfig,
    pool: Option<rayon::ThreadPool>,
}

impl GridExecutor {
    /// Create an executor, building a dedicated pool when `max_threads > 0`.
    pub fn new(config: ParallelConfig) -> Result<Self, EngineError> {
        let pool = if config.max_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.max_threads)
                .thread_name(|i| format!("walkforward-grid-{i}"))
                .build()
                .map_err(|e| EngineError::ThreadPool {
                    message: e.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };

        let executor = Self { config, pool };
        info!(
            threads = executor.effective_thread_count(),
            min_parallel_jobs = executor.config.min_parallel_jobs,
            "Grid executor ready"
        );

        Ok(executor)
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Get effective thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
    }

    /// Run `job` for every candidate.
    ///
    /// `cancel` is checked before each candidate starts; candidates not
    /// started are reported as [`CandidateOutcome::Skipped`].
    pub fn evaluate<T, F>(
        &self,
        candidates: &[Parameters],
        cancel: &Cancellation,
        job: F,
    ) -> GridRun<T>
    where
        T: Send,
        F: Fn(&Parameters) -> Result<T, SimulationError> + Sync,
    {
        let tracker = ProgressTracker::new(candidates.len() as u64);

        let run_one = |params: &Parameters| -> CandidateOutcome<T> {
            if cancel.is_cancelled() {
                return CandidateOutcome::Skipped;
            }
            let outcome = match job(params) {
                Ok(value) => CandidateOutcome::Completed(value),
                Err(e) => CandidateOutcome::Failed(e),
            };
            tracker.job_completed(!outcome.is_failed());

            if self.config.track_progress {
                let progress = tracker.progress();
                debug!(
                    params = %params,
                    completed = progress.completed,
                    total = progress.total,
                    succeeded = progress.succeeded(),
                    failed = progress.failed,
                    percent = progress.percentage(),
                    "Candidate evaluated"
                );
            }

            outcome
        };

        let outcomes: Vec<CandidateOutcome<T>> = if candidates.len() < self.config.min_parallel_jobs
        {
            candidates.iter().map(&run_one).collect()
        } else if let Some(pool) = &self.pool {
            pool.install(|| candidates.par_iter().map(&run_one).collect())
        } else {
            candidates.par_iter().map(&run_one).collect()
        };

        let cancelled = outcomes
            .iter()
            .any(|o| matches!(o, CandidateOutcome::Skipped));

        GridRun {
            outcomes,
            cancelled,
            progress: tracker.progress(),
        }
    }
}
