//! Walk-forward analysis and out-of-sample testing.
//!
//! - Rolling or anchored window generation over bar indices
//! - In-sample grid optimization with a configurable selection metric
//! - Out-of-sample testing of each window's winner
//! - Aggregated out-of-sample curve and metrics
//! - Overfitting and parameter stability diagnostics

mod analysis;
mod builder;
mod cancel;
mod engine;
mod selection;
mod types;

pub use analysis::{aggregate_curve, analyze_overfitting, analyze_parameter_stability, median};
pub use builder::WalkForwardBuilder;
pub use cancel::Cancellation;
pub use engine::WalkForwardEngine;
pub use selection::SelectionMetric;
pub use types::{
    OverfittingAnalysis, ParameterStability, PartialWindowPolicy, WalkForwardConfig,
    WalkForwardReport, Window, WindowMode, WindowResult, WindowStatus,
};

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::metrics::Metrics;

    #[test]
    fn test_walk_forward_config_default() {
        let config = WalkForwardConfig::default();
        assert_eq!(config.in_sample_bars, 252);
        assert_eq!(config.out_of_sample_bars, 63);
        assert_eq!(config.window_mode, WindowMode::Rolling);
        assert_eq!(config.partial_window, PartialWindowPolicy::Drop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: WalkForwardConfig = serde_json::from_str(
            r#"{"in_sample_bars": 100, "window_mode": "anchored", "selection_metric": "max_drawdown"}"#,
        )
        .unwrap();
        assert_eq!(config.in_sample_bars, 100);
        assert_eq!(config.out_of_sample_bars, 63);
        assert_eq!(config.window_mode, WindowMode::Anchored);
        assert_eq!(config.selection_metric, SelectionMetric::MaxDrawdown);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let zero_oos = WalkForwardConfig {
            out_of_sample_bars: 0,
            ..WalkForwardConfig::default()
        };
        assert!(zero_oos.validate().is_err());

        let negative = WalkForwardConfig {
            overfitting_threshold: dec!(-0.1),
            ..WalkForwardConfig::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_sharpe_degradation() {
        let mut result = {
            let ts = chrono::Utc::now();
            WindowResult {
                window: Window {
                    index: 0,
                    in_sample: 0..10,
                    out_of_sample: 10..20,
                    partial: false,
                    in_sample_start: ts,
                    in_sample_end: ts,
                    out_of_sample_start: ts,
                    out_of_sample_end: ts,
                },
                chosen_params: None,
                in_sample_metrics: Metrics {
                    sharpe_ratio: dec!(2),
                    ..Metrics::neutral()
                },
                out_of_sample_metrics: Metrics {
                    sharpe_ratio: dec!(1),
                    ..Metrics::neutral()
                },
                status: WindowStatus::Completed,
                candidates_evaluated: 1,
                candidates_failed: 0,
                error: None,
                out_of_sample_curve: None,
            }
        };

        // (2 - 1) / 2 = 0.5
        assert_eq!(result.sharpe_degradation(), Some(dec!(0.5)));
        assert!(!result.is_overfit(dec!(0.5)));
        assert!(result.is_overfit(dec!(0.4)));

        result.status = WindowStatus::OutOfSampleFailed;
        assert_eq!(result.sharpe_degradation(), None);
    }
}
