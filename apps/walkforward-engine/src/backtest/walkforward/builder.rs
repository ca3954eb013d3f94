//! Builder pattern for walk-forward analysis configuration.

use rust_decimal::Decimal;

use super::engine::WalkForwardEngine;
use super::selection::SelectionMetric;
use super::types::{PartialWindowPolicy, WalkForwardConfig, WindowMode};
use crate::backtest::config::BacktestConfig;
use crate::backtest::metrics::MetricsConfig;
use crate::backtest::parallel::ParallelConfig;

/// Builder for walk-forward analysis.
#[derive(Debug, Default)]
pub struct WalkForwardBuilder {
    config: WalkForwardConfig,
    backtest: BacktestConfig,
    metrics: MetricsConfig,
    parallel: ParallelConfig,
}

impl WalkForwardBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set in-sample window size in bars.
    #[must_use]
    pub const fn in_sample_bars(mut self, bars: usize) -> Self {
        self.config.in_sample_bars = bars;
        self
    }

    /// Set out-of-sample window size in bars.
    #[must_use]
    pub const fn out_of_sample_bars(mut self, bars: usize) -> Self {
        self.config.out_of_sample_bars = bars;
        self
    }

    /// Set the advance between windows.
    #[must_use]
    pub const fn step_bars(mut self, bars: usize) -> Self {
        self.config.step_bars = Some(bars);
        self
    }

    /// Set window mode.
    #[must_use]
    pub const fn window_mode(mut self, mode: WindowMode) -> Self {
        self.config.window_mode = mode;
        self
    }

    /// Set handling of a truncated final window.
    #[must_use]
    pub const fn partial_window(mut self, policy: PartialWindowPolicy) -> Self {
        self.config.partial_window = policy;
        self
    }

    /// Set the in-sample selection metric.
    #[must_use]
    pub const fn selection_metric(mut self, metric: SelectionMetric) -> Self {
        self.config.selection_metric = metric;
        self
    }

    /// Set overfitting threshold.
    #[must_use]
    pub const fn overfitting_threshold(mut self, threshold: Decimal) -> Self {
        self.config.overfitting_threshold = threshold;
        self
    }

    /// Replace the walk-forward configuration wholesale.
    #[must_use]
    pub fn config(mut self, config: WalkForwardConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the simulation settings used for every run.
    #[must_use]
    pub fn backtest(mut self, backtest: BacktestConfig) -> Self {
        self.backtest = backtest;
        self
    }

    /// Set the metrics settings.
    #[must_use]
    pub const fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the grid executor settings.
    #[must_use]
    pub fn parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the walk-forward engine.
    ///
    /// Configuration is checked when the engine runs.
    #[must_use]
    pub fn build(self) -> WalkForwardEngine {
        WalkForwardEngine::new(self.config, self.backtest, self.metrics, self.parallel)
    }
}
