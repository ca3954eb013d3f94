//! Progress tracking for parallel candidate evaluation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Lock-free counters shared by the workers of one grid run.
#[derive(Debug)]
pub struct ProgressTracker {
    total_jobs: u64,
    completed_jobs: AtomicU64,
    failed_jobs: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    #[must_use]
    pub fn new(total_jobs: u64) -> Self {
        Self {
            total_jobs,
            completed_jobs: AtomicU64::new(0),
            failed_jobs: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished candidate.
    pub fn job_completed(&self, success: bool) {
        self.completed_jobs.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed_jobs.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            total: self.total_jobs,
            completed: self.completed_jobs.load(Ordering::Relaxed),
            failed: self.failed_jobs.load(Ordering::Relaxed),
            elapsed_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Total number of candidates.
    pub total: u64,
    /// Finished candidates, successful or not.
    pub completed: u64,
    /// Failed candidates.
    pub failed: u64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
}

impl Progress {
    /// Get completion percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Candidates that finished without error.
    #[must_use]
    pub const fn succeeded(&self) -> u64 {
        self.completed.saturating_sub(self.failed)
    }
}
