// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::items_after_statements
    )
)]

//! Walk-forward Engine - Rust Core Library
//!
//! Deterministic simulation and walk-forward optimization of trading
//! strategies over historical price series.
//!
//! # Layout
//!
//! - [`backtest`]: the core.
//!   - `series`: validated, time-ordered bars
//!   - `strategy`: the `decide` contract and concrete strategies
//!   - `engine`: bar-by-bar simulation producing an equity curve
//!   - `metrics`: reduction of a curve to risk/return statistics
//!   - `parallel`: typed parameter spaces and the Rayon grid executor
//!   - `walkforward`: window generation, per-window optimization, aggregation
//! - [`config`]: YAML configuration with environment interpolation (boundary only)
//! - [`error`]: error taxonomy shared by every entry point
//! - [`telemetry`]: tracing subscriber setup for the binary
//!
//! The library never reads global configuration; every entry point takes its
//! configuration values explicitly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Simulation, metrics and walk-forward optimization.
pub mod backtest;

/// Configuration file loading and validation.
pub mod config;

/// Error taxonomy.
pub mod error;

/// Tracing subscriber initialization.
pub mod telemetry;

pub use backtest::{
    BacktestConfig, BacktestEngine, BacktestOutcome, Bar, Cancellation, EquityCurve, EquityPoint,
    Metrics, MetricsCalculator, MetricsConfig, ParallelConfig, ParamDomain, ParamValue,
    Parameters, ParameterSpace, PartialWindowPolicy, Position, PriceSeries, SelectionMetric,
    Strategy, StrategyError, Trade, TransactionCost, WalkForwardBuilder, WalkForwardConfig,
    WalkForwardEngine, WalkForwardReport, Window, WindowMode, WindowResult, WindowStatus,
    run_backtest,
};
pub use error::{ConfigurationError, DataError, EngineError, SimulationError};
