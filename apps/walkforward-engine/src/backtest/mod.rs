//! Backtest simulation and walk-forward optimization.
//!
//! This module provides the deterministic core:
//!
//! - **Series**: validated, strictly time-ordered OHLC(V) bars
//! - **Strategies**: a pure `decide` contract over the history seen so far
//! - **Simulation**: next-bar-open execution with proportional and fixed costs
//! - **Metrics**: total return, drawdown, Sharpe, Sortino, win rate, exposure
//! - **Walk-forward**: per-window grid optimization and out-of-sample testing
//!
//! # Example
//!
//! ```ignore
//! use walkforward_engine::backtest::{
//!     BacktestConfig, MetricsConfig, Parameters, PriceSeries, SmaCross, run_backtest,
//! };
//!
//! let series = PriceSeries::new(bars)?;
//! let params = Parameters::new().with("fast", 10).with("slow", 30);
//! let outcome = run_backtest(
//!     &series,
//!     &SmaCross,
//!     &params,
//!     &BacktestConfig::default(),
//!     &MetricsConfig::default(),
//! )?;
//!
//! println!("{}", outcome.metrics.sharpe_ratio);
//! ```

mod commission;
mod config;
mod engine;
mod metrics;
mod parallel;
mod position;
mod series;
mod strategy;
mod trade;
mod walkforward;

use serde::Serialize;
use tracing::info;

pub use commission::{calculate_fill_cost, size_entry};
pub use config::{BacktestConfig, TransactionCost};
pub use engine::BacktestEngine;
pub use metrics::{
    EquityCurve, EquityPoint, Metrics, MetricsCalculator, MetricsConfig, format_pct, format_ratio,
};
pub use parallel::{
    CandidateOutcome, GridExecutor, GridRun, MAX_GRID_COMBINATIONS, ParallelConfig, ParamDomain,
    ParamRange, ParamValue, ParameterSpace, ParameterSpaceBuilder, Parameters, Progress,
    ProgressTracker,
};
pub use position::Position;
pub use series::{Bar, MIN_SERIES_LEN, PriceSeries};
pub use strategy::{Breakout, MeanReversion, SmaCross, Strategy, StrategyError, registry};
pub use trade::Trade;
pub use walkforward::{
    Cancellation, OverfittingAnalysis, ParameterStability, PartialWindowPolicy, SelectionMetric,
    WalkForwardBuilder, WalkForwardConfig, WalkForwardEngine, WalkForwardReport, Window,
    WindowMode, WindowResult, WindowStatus, aggregate_curve, analyze_overfitting,
    analyze_parameter_stability, median,
};

use crate::error::EngineError;

/// Curve and summary of a single backtest.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutcome {
    /// Simulated equity curve.
    pub curve: EquityCurve,
    /// Metrics of the curve.
    pub metrics: Metrics,
}

/// Simulate one strategy/parameter pair over a whole series and summarize it.
pub fn run_backtest(
    series: &PriceSeries,
    strategy: &dyn Strategy,
    params: &Parameters,
    backtest: &BacktestConfig,
    metrics: &MetricsConfig,
) -> Result<BacktestOutcome, EngineError> {
    let engine = BacktestEngine::new(backtest.clone())?;
    metrics.validate()?;
    let curve = engine.run_series(series, strategy, params)?;
    let metrics = MetricsCalculator::new(*metrics).summarize(&curve);

    info!(
        strategy = strategy.name(),
        params = %params,
        trades = metrics.trade_count,
        total_return = %format_pct(metrics.total_return),
        sharpe = %format_ratio(metrics.sharpe_ratio),
        "Backtest complete"
    );

    Ok(BacktestOutcome { curve, metrics })
}
