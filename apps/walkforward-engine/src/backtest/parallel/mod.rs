//! Parameter grids and parallel candidate evaluation.
//!
//! - [`ParameterSpace`] expands into a deterministic grid of [`Parameters`]
//! - [`GridExecutor`] runs one job per candidate on a Rayon pool and returns
//!   outcomes in grid order
//!
//! # Thread Pool Configuration
//!
//! With `max_threads = 0` the global Rayon pool is used as is. Any other
//! value builds a pool owned by the executor, so several engines with
//! different limits can coexist in one process.

mod config;
mod executor;
mod grid;
mod progress;
mod result;
mod types;

pub use config::ParallelConfig;
pub use executor::GridExecutor;
pub use grid::{MAX_GRID_COMBINATIONS, ParamDomain, ParamRange, ParameterSpace, ParameterSpaceBuilder};
pub use progress::{Progress, ProgressTracker};
pub use result::{CandidateOutcome, GridRun};
pub use types::{ParamValue, Parameters};
