//! Configuration for parallel candidate evaluation.

use serde::{Deserialize, Serialize};

/// Configuration for parallel candidate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Maximum number of threads to use (0 = use all available).
    ///
    /// A non-zero value builds a dedicated pool; the global pool is never
    /// reconfigured.
    pub max_threads: usize,

    /// Minimum parallelization threshold (grids below this run sequentially).
    pub min_parallel_jobs: usize,

    /// Whether to log per-candidate progress at debug level.
    pub track_progress: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            min_parallel_jobs: 4,
            track_progress: true,
        }
    }
}
