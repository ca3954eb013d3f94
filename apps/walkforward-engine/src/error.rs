//! Error taxonomy for the simulation and optimization core.
//!
//! | Error | Raised by | Propagation |
//! |-------|-----------|-------------|
//! | [`DataError`] | `PriceSeries` construction | Always surfaced to the caller |
//! | [`ConfigurationError`] | Config/grid/window validation | Always surfaced, before any simulation |
//! | [`SimulationError`] | A single backtest run | Recovered per candidate by the optimizer |
//! | [`EngineError`] | Top-level entry points | Wraps the above plus run-wide failures |

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed or insufficient price data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    /// Fewer bars than the minimum series length.
    #[error("price series has {len} bars, need at least {minimum}")]
    TooShort {
        /// Number of bars supplied.
        len: usize,
        /// Minimum accepted length.
        minimum: usize,
    },

    /// Timestamps are not strictly increasing.
    #[error("bar {index} timestamp {current} is not after previous timestamp {previous}")]
    NonMonotonicTimestamp {
        /// Index of the offending bar.
        index: usize,
        /// Timestamp of the preceding bar.
        previous: DateTime<Utc>,
        /// Timestamp of the offending bar.
        current: DateTime<Utc>,
    },

    /// A price field is zero or negative.
    #[error("bar {index} has non-positive {field} price {value}")]
    NonPositivePrice {
        /// Index of the offending bar.
        index: usize,
        /// Name of the price field.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// High is below low.
    #[error("bar {index} has high {high} below low {low}")]
    InvertedRange {
        /// Index of the offending bar.
        index: usize,
        /// Bar high.
        high: Decimal,
        /// Bar low.
        low: Decimal,
    },

    /// Volume is negative.
    #[error("bar {index} has negative volume {volume}")]
    NegativeVolume {
        /// Index of the offending bar.
        index: usize,
        /// Offending volume.
        volume: Decimal,
    },
}

/// Failure of a single backtest run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The strategy rejected the supplied parameters.
    #[error("strategy '{strategy}' rejected parameters {parameters}: {message}")]
    InvalidParameters {
        /// Strategy name.
        strategy: String,
        /// Canonical parameter encoding.
        parameters: String,
        /// Rejection reason.
        message: String,
    },

    /// The strategy failed while deciding at a bar.
    #[error("strategy '{strategy}' failed at bar {bar_index}: {message}")]
    StrategyFailed {
        /// Strategy name.
        strategy: String,
        /// Index of the bar being decided (relative to the simulated slice).
        bar_index: usize,
        /// Failure reason.
        message: String,
    },

    /// The strategy asked for a short position while shorting is disabled.
    #[error("strategy '{strategy}' requested a short at bar {bar_index} but shorting is disabled")]
    ShortNotAllowed {
        /// Strategy name.
        strategy: String,
        /// Index of the bar being decided.
        bar_index: usize,
    },
}

/// Inconsistent configuration, detected before any simulation work.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A length or count that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroLength {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The in-sample window does not fit the series.
    #[error("in-sample length {in_sample_bars} must be shorter than the series ({series_len} bars)")]
    InSampleTooLong {
        /// Configured in-sample length.
        in_sample_bars: usize,
        /// Series length.
        series_len: usize,
    },

    /// Out-of-sample segments would overlap.
    #[error("step {step_bars} is shorter than the out-of-sample length {out_of_sample_bars}")]
    StepTooSmall {
        /// Configured step.
        step_bars: usize,
        /// Configured out-of-sample length.
        out_of_sample_bars: usize,
    },

    /// The series produces no window under the configured policy.
    #[error("series of {series_len} bars yields no complete walk-forward window (need {required})")]
    NoWindows {
        /// Series length.
        series_len: usize,
        /// Bars needed for one full window.
        required: usize,
    },

    /// Warm-up consumes the whole in-sample segment.
    #[error("warm-up of {warm_up_bars} bars leaves nothing to score in {in_sample_bars} in-sample bars")]
    WarmUpTooLong {
        /// Configured warm-up.
        warm_up_bars: usize,
        /// Configured in-sample length.
        in_sample_bars: usize,
    },

    /// An invalid numeric setting.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Reason.
        message: String,
    },

    /// A parameter has no candidate values.
    #[error("parameter '{name}' has no candidate values")]
    EmptyParameterCandidates {
        /// Parameter name.
        name: String,
    },

    /// A parameter range is malformed.
    #[error("parameter '{name}' has an invalid range: {message}")]
    InvalidParameterRange {
        /// Parameter name.
        name: String,
        /// Reason.
        message: String,
    },

    /// A parameter lists the same candidate twice.
    #[error("parameter '{name}' lists candidate {value} more than once")]
    DuplicateParameterValue {
        /// Parameter name.
        name: String,
        /// Duplicated value.
        value: String,
    },

    /// The grid has more combinations than allowed.
    #[error("parameter grid has {combinations} combinations, limit is {limit}")]
    GridTooLarge {
        /// Number of combinations requested.
        combinations: usize,
        /// Maximum allowed.
        limit: usize,
    },
}

/// Top-level error returned by engine entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid input data.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Invalid configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A plain (non walk-forward) backtest failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// Every candidate of every evaluated window failed.
    #[error("all {candidates} candidates failed across {windows} windows")]
    AllCandidatesFailed {
        /// Windows evaluated.
        windows: usize,
        /// Candidates evaluated.
        candidates: usize,
    },

    /// The worker pool could not be created.
    #[error("failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message.
        message: String,
    },
}
