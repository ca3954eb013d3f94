//! Walk-forward optimization engine.

use tracing::{debug, info, warn};

use super::analysis::{aggregate_curve, analyze_overfitting, analyze_parameter_stability};
use super::cancel::Cancellation;
use super::types::{
    PartialWindowPolicy, WalkForwardConfig, WalkForwardReport, Window, WindowMode, WindowResult,
    WindowStatus,
};
use crate::backtest::config::BacktestConfig;
use crate::backtest::engine::BacktestEngine;
use crate::backtest::metrics::{Metrics, MetricsCalculator, MetricsConfig, format_pct, format_ratio};
use crate::backtest::parallel::{CandidateOutcome, GridExecutor, ParallelConfig, ParameterSpace, Parameters};
use crate::backtest::series::PriceSeries;
use crate::backtest::strategy::Strategy;
use crate::error::{ConfigurationError, EngineError};

/// Walk-forward optimization engine.
///
/// Holds configuration only; every call to [`optimize`](Self::optimize) is
/// independent.
#[derive(Debug, Clone, Default)]
pub struct WalkForwardEngine {
    config: WalkForwardConfig,
    backtest: BacktestConfig,
    metrics: MetricsConfig,
    parallel: ParallelConfig,
}

impl WalkForwardEngine {
    /// Create a new walk-forward engine.
    #[must_use]
    pub const fn new(
        config: WalkForwardConfig,
        backtest: BacktestConfig,
        metrics: MetricsConfig,
        parallel: ParallelConfig,
    ) -> Self {
        Self {
            config,
            backtest,
            metrics,
            parallel,
        }
    }

    /// Access the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &WalkForwardConfig {
        &self.config
    }

    /// Backtest configuration used for every run.
    #[must_use]
    pub const fn backtest_config(&self) -> &BacktestConfig {
        &self.backtest
    }

    /// Metrics configuration used for every summary.
    #[must_use]
    pub const fn metrics_config(&self) -> &MetricsConfig {
        &self.metrics
    }

    /// Parallel execution configuration.
    #[must_use]
    pub const fn parallel_config(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Partition `series` into in-sample/out-of-sample windows.
    ///
    /// Window `k` starts its in-sample range at `k * step` (rolling) or at 0
    /// (anchored, with the range growing by `step` each window). Generation
    /// stops once an out-of-sample range would start at or past the end.
    pub fn generate_windows(&self, series: &PriceSeries) -> Result<Vec<Window>, ConfigurationError> {
        self.config.validate()?;

        let len = series.len();
        let in_len = self.config.in_sample_bars;
        let out_len = self.config.out_of_sample_bars;
        let step = self.config.step();

        if in_len >= len {
            return Err(ConfigurationError::InSampleTooLong {
                in_sample_bars: in_len,
                series_len: len,
            });
        }

        let bars = series.bars();
        let mut windows = Vec::new();
        for index in 0.. {
            let offset = index * step;
            let (is_start, is_end) = match self.config.window_mode {
                WindowMode::Rolling => (offset, offset + in_len),
                WindowMode::Anchored => (0, in_len + offset),
            };
            let oos_start = is_end;
            if oos_start >= len {
                break;
            }

            let full_end = oos_start + out_len;
            let partial = full_end > len;
            if partial && self.config.partial_window == PartialWindowPolicy::Drop {
                break;
            }
            let oos_end = full_end.min(len);

            windows.push(Window {
                index,
                in_sample: is_start..is_end,
                out_of_sample: oos_start..oos_end,
                partial,
                in_sample_start: bars[is_start].timestamp,
                in_sample_end: bars[is_end - 1].timestamp,
                out_of_sample_start: bars[oos_start].timestamp,
                out_of_sample_end: bars[oos_end - 1].timestamp,
            });
        }

        if windows.is_empty() {
            return Err(ConfigurationError::NoWindows {
                series_len: len,
                required: in_len + out_len,
            });
        }

        info!(
            windows = windows.len(),
            mode = ?self.config.window_mode,
            partial = windows.iter().any(|w| w.partial),
            "Generated walk-forward windows"
        );

        Ok(windows)
    }

    /// Cross-checks between the walk-forward, backtest and metrics settings.
    fn check_consistency(&self) -> Result<(), ConfigurationError> {
        self.metrics.validate()?;

        let warm_up_bars = self.backtest.warm_up_bars;
        if warm_up_bars >= self.config.in_sample_bars {
            return Err(ConfigurationError::WarmUpTooLong {
                warm_up_bars,
                in_sample_bars: self.config.in_sample_bars,
            });
        }
        if warm_up_bars >= self.config.out_of_sample_bars {
            warn!(
                warm_up_bars,
                out_of_sample_bars = self.config.out_of_sample_bars,
                "Warm-up covers every out-of-sample segment, no out-of-sample trades are possible"
            );
        }
        Ok(())
    }

    /// Run walk-forward optimization of `strategy` over `space`.
    ///
    /// Configuration and grid problems are reported before any simulation.
    /// Candidate failures are counted per window; the run fails only when
    /// every evaluated candidate failed. On cancellation the window in
    /// progress is discarded and the report is flagged `cancelled`.
    pub fn optimize(
        &self,
        series: &PriceSeries,
        strategy: &dyn Strategy,
        space: &ParameterSpace,
        cancel: &Cancellation,
    ) -> Result<WalkForwardReport, EngineError> {
        let backtester = BacktestEngine::new(self.backtest.clone())?;
        self.check_consistency()?;
        let calculator = MetricsCalculator::new(self.metrics);
        let grid = space.grid()?;
        let windows = self.generate_windows(series)?;
        let executor = GridExecutor::new(self.parallel.clone())?;

        info!(
            strategy = strategy.name(),
            bars = series.len(),
            windows = windows.len(),
            candidates = grid.len(),
            parameters = ?space.names().collect::<Vec<_>>(),
            metric = ?self.config.selection_metric,
            "Starting walk-forward optimization"
        );

        let mut results = Vec::with_capacity(windows.len());
        let mut cancelled = false;
        let mut evaluated = 0usize;
        let mut failed = 0usize;

        for window in windows {
            if cancel.is_cancelled() {
                cancelled = true;
                warn!(window = window.index, "Walk-forward cancelled before window");
                break;
            }

            let in_sample = series.slice(window.in_sample.clone());
            let run = executor.evaluate(&grid, cancel, |params| {
                backtester
                    .run(in_sample, strategy, params)
                    .map(|curve| calculator.summarize(&curve))
            });

            if run.cancelled {
                cancelled = true;
                warn!(
                    window = window.index,
                    evaluated = run.evaluated_count(),
                    "Walk-forward cancelled mid-window, discarding it"
                );
                break;
            }

            for (params, outcome) in grid.iter().zip(&run.outcomes) {
                if let CandidateOutcome::Failed(e) = outcome {
                    warn!(window = window.index, params = %params, error = %e, "Candidate failed");
                }
            }

            let window_failed = run.failed_count();
            evaluated += run.evaluated_count();
            failed += window_failed;

            let best = self
                .config
                .selection_metric
                .select(run.completed().map(|(i, m)| (&grid[i], m)));

            let result = match best {
                None => {
                    warn!(
                        window = window.index,
                        candidates = grid.len(),
                        "No valid candidates in window"
                    );
                    WindowResult {
                        window,
                        chosen_params: None,
                        in_sample_metrics: Metrics::neutral(),
                        out_of_sample_metrics: Metrics::neutral(),
                        status: WindowStatus::NoValidCandidates,
                        candidates_evaluated: grid.len(),
                        candidates_failed: window_failed,
                        error: None,
                        out_of_sample_curve: None,
                    }
                }
                Some((params, in_sample_metrics)) => self.test_out_of_sample(
                    &backtester,
                    &calculator,
                    series,
                    strategy,
                    window,
                    params,
                    in_sample_metrics.clone(),
                    grid.len(),
                    window_failed,
                ),
            };
            results.push(result);
        }

        if evaluated > 0 && failed == evaluated {
            return Err(EngineError::AllCandidatesFailed {
                windows: results.len(),
                candidates: evaluated,
            });
        }

        let aggregate_curve = aggregate_curve(self.backtest.initial_equity, &results);
        let aggregate_metrics = calculator.summarize(&aggregate_curve);
        let overfitting = analyze_overfitting(
            &results,
            &aggregate_metrics,
            self.config.overfitting_threshold,
        );
        let parameter_stability = analyze_parameter_stability(&results);

        let completed = results.iter().filter(|w| w.is_completed()).count();
        info!(
            strategy = strategy.name(),
            windows = results.len(),
            completed,
            failed_candidates = failed,
            cancelled,
            total_return = %format_pct(aggregate_metrics.total_return),
            sharpe = %format_ratio(aggregate_metrics.sharpe_ratio),
            overfit_risk = %format_ratio(overfitting.overfit_risk),
            "Walk-forward optimization complete"
        );
        if let Some(warning) = &overfitting.warning {
            warn!(warning = %warning, "Overfitting detected");
        }
        if let Some(warning) = &parameter_stability.warning {
            warn!(warning = %warning, "Unstable parameters");
        }

        Ok(WalkForwardReport {
            strategy: strategy.name().to_string(),
            config: self.config.clone(),
            windows: results,
            aggregate_metrics,
            aggregate_curve,
            overfitting,
            parameter_stability,
            failed_candidates: failed,
            cancelled,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn test_out_of_sample(
        &self,
        backtester: &BacktestEngine,
        calculator: &MetricsCalculator,
        series: &PriceSeries,
        strategy: &dyn Strategy,
        window: Window,
        params: &Parameters,
        in_sample_metrics: Metrics,
        candidates_evaluated: usize,
        candidates_failed: usize,
    ) -> WindowResult {
        let out_of_sample = series.slice(window.out_of_sample.clone());
        match backtester.run(out_of_sample, strategy, params) {
            Ok(curve) => {
                let out_of_sample_metrics = calculator.summarize(&curve);
                info!(
                    window = window.index,
                    params = %params,
                    is_sharpe = %format_ratio(in_sample_metrics.sharpe_ratio),
                    oos_sharpe = %format_ratio(out_of_sample_metrics.sharpe_ratio),
                    oos_return = %format_pct(out_of_sample_metrics.total_return),
                    "Window complete"
                );
                WindowResult {
                    window,
                    chosen_params: Some(params.clone()),
                    in_sample_metrics,
                    out_of_sample_metrics,
                    status: WindowStatus::Completed,
                    candidates_evaluated,
                    candidates_failed,
                    error: None,
                    out_of_sample_curve: Some(curve),
                }
            }
            Err(e) => {
                warn!(
                    window = window.index,
                    params = %params,
                    error = %e,
                    "Chosen parameters failed out of sample"
                );
                debug!(
                    metric = ?self.config.selection_metric,
                    "Window excluded from aggregate"
                );
                WindowResult {
                    window,
                    chosen_params: Some(params.clone()),
                    in_sample_metrics,
                    out_of_sample_metrics: Metrics::neutral(),
                    status: WindowStatus::OutOfSampleFailed,
                    candidates_evaluated,
                    candidates_failed,
                    error: Some(e.to_string()),
                    out_of_sample_curve: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::series::fixtures::series_from_closes;
    use crate::backtest::strategy::SmaCross;
    use crate::backtest::walkforward::WalkForwardBuilder;

    fn series(len: usize) -> PriceSeries {
        let closes: Vec<_> = (0..len).map(|i| dec!(100) + rust_decimal::Decimal::from(i as u64)).collect();
        series_from_closes(&closes)
    }

    #[test]
    fn test_generate_windows_rolling() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .build();

        let windows = engine.generate_windows(&series(55)).unwrap();
        assert_eq!(windows.len(), 3);

        for (i, window) in windows.iter().enumerate() {
            assert_eq!(window.index, i);
            assert_eq!(window.in_sample.len(), 20);
            assert_eq!(window.in_sample.end, window.out_of_sample.start);
            assert_eq!(window.out_of_sample.len(), 10);
            assert!(!window.partial);
            assert!(window.in_sample_end < window.out_of_sample_start);
        }
        assert_eq!(windows[2].out_of_sample, 40..50);
    }

    #[test]
    fn test_out_of_sample_ranges_never_overlap() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .step_bars(15)
            .build();
        let windows = engine.generate_windows(&series(100)).unwrap();
        for pair in windows.windows(2) {
            assert!(pair[0].out_of_sample.end <= pair[1].out_of_sample.start);
        }
        for (k, window) in windows.iter().enumerate() {
            for earlier in &windows[..=k] {
                assert!(earlier.in_sample.end <= window.out_of_sample.start);
            }
        }
    }

    #[test]
    fn test_generate_windows_anchored() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .window_mode(WindowMode::Anchored)
            .build();

        let windows = engine.generate_windows(&series(50)).unwrap();
        assert_eq!(windows.len(), 3);
        for window in &windows {
            assert_eq!(window.in_sample.start, 0);
        }
        assert_eq!(windows[2].in_sample, 0..40);
    }

    #[test]
    fn test_partial_window_policy() {
        let drop = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .build();
        assert_eq!(drop.generate_windows(&series(45)).unwrap().len(), 2);

        let include = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .partial_window(PartialWindowPolicy::Include)
            .build();
        let windows = include.generate_windows(&series(45)).unwrap();
        assert_eq!(windows.len(), 3);
        assert!(windows[2].partial);
        assert_eq!(windows[2].out_of_sample, 40..45);
    }

    #[test]
    fn test_insufficient_data() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .build();

        assert!(matches!(
            engine.generate_windows(&series(20)),
            Err(ConfigurationError::InSampleTooLong { .. })
        ));
        assert!(matches!(
            engine.generate_windows(&series(25)),
            Err(ConfigurationError::NoWindows { .. })
        ));
    }

    #[test]
    fn test_step_shorter_than_out_of_sample_rejected() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .step_bars(5)
            .build();
        assert!(matches!(
            engine.generate_windows(&series(100)),
            Err(ConfigurationError::StepTooSmall { .. })
        ));
    }

    fn sma_space() -> ParameterSpace {
        ParameterSpace::builder()
            .add_int_param("fast", vec![2, 3])
            .add_int_param("slow", vec![5])
            .build()
    }

    #[test]
    fn test_warm_up_covering_in_sample_rejected() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(40)
            .out_of_sample_bars(10)
            .backtest(BacktestConfig {
                warm_up_bars: 50,
                ..BacktestConfig::default()
            })
            .build();

        let result = engine.optimize(&series(100), &SmaCross, &sma_space(), &Cancellation::none());
        assert!(matches!(
            result,
            Err(EngineError::Configuration(ConfigurationError::WarmUpTooLong {
                warm_up_bars: 50,
                in_sample_bars: 40,
            }))
        ));
    }

    #[test]
    fn test_warm_up_shorter_than_in_sample_accepted() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(40)
            .out_of_sample_bars(10)
            .backtest(BacktestConfig {
                warm_up_bars: 5,
                ..BacktestConfig::default()
            })
            .build();

        let report = engine
            .optimize(&series(100), &SmaCross, &sma_space(), &Cancellation::none())
            .unwrap();
        assert!(!report.windows.is_empty());
    }

    #[test]
    fn test_zero_periods_per_year_rejected_before_simulation() {
        let engine = WalkForwardBuilder::new()
            .in_sample_bars(20)
            .out_of_sample_bars(10)
            .metrics(MetricsConfig { periods_per_year: 0 })
            .build();

        let result = engine.optimize(&series(60), &SmaCross, &sma_space(), &Cancellation::none());
        assert!(matches!(
            result,
            Err(EngineError::Configuration(ConfigurationError::InvalidValue {
                field: "periods_per_year",
                ..
            }))
        ));
    }
}
