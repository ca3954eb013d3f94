//! Core types for walk-forward analysis.

use std::ops::Range;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::selection::SelectionMetric;
use crate::backtest::metrics::{EquityCurve, Metrics};
use crate::backtest::parallel::Parameters;
use crate::error::ConfigurationError;

/// Window mode for walk-forward analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Rolling window: fixed-size in-sample window moves forward.
    #[default]
    Rolling,
    /// Anchored window: in-sample start is fixed, window grows over time.
    Anchored,
}

/// What to do with a final window whose out-of-sample half is cut short by
/// the end of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartialWindowPolicy {
    /// Discard it.
    #[default]
    Drop,
    /// Keep it with the shorter out-of-sample slice.
    Include,
}

/// Configuration for walk-forward analysis. Lengths are in bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkForwardConfig {
    /// In-sample window size.
    pub in_sample_bars: usize,
    /// Out-of-sample window size.
    pub out_of_sample_bars: usize,
    /// Advance between windows (defaults to the out-of-sample size).
    pub step_bars: Option<usize>,
    /// Window mode (rolling or anchored).
    pub window_mode: WindowMode,
    /// Handling of a truncated final window.
    pub partial_window: PartialWindowPolicy,
    /// Metric used to choose the in-sample winner.
    pub selection_metric: SelectionMetric,
    /// Sharpe ratio degradation threshold (0.5 = 50% drop is flagged).
    pub overfitting_threshold: Decimal,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            in_sample_bars: 252,
            out_of_sample_bars: 63,
            step_bars: None,
            window_mode: WindowMode::Rolling,
            partial_window: PartialWindowPolicy::Drop,
            selection_metric: SelectionMetric::SharpeRatio,
            overfitting_threshold: Decimal::new(5, 1),
        }
    }
}

impl WalkForwardConfig {
    /// Advance between consecutive windows.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step_bars.unwrap_or(self.out_of_sample_bars)
    }

    /// Check the configuration independently of any series.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.in_sample_bars == 0 {
            return Err(ConfigurationError::ZeroLength {
                field: "in_sample_bars",
            });
        }
        if self.out_of_sample_bars == 0 {
            return Err(ConfigurationError::ZeroLength {
                field: "out_of_sample_bars",
            });
        }
        if self.step_bars == Some(0) {
            return Err(ConfigurationError::ZeroLength { field: "step_bars" });
        }
        if self.step() < self.out_of_sample_bars {
            return Err(ConfigurationError::StepTooSmall {
                step_bars: self.step(),
                out_of_sample_bars: self.out_of_sample_bars,
            });
        }
        if self.overfitting_threshold < Decimal::ZERO {
            return Err(ConfigurationError::InvalidValue {
                field: "overfitting_threshold",
                message: format!("must not be negative, got {}", self.overfitting_threshold),
            });
        }
        Ok(())
    }
}

/// One in-sample/out-of-sample split, as half-open bar index ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    /// Window index (0-based).
    pub index: usize,
    /// In-sample bar range.
    pub in_sample: Range<usize>,
    /// Out-of-sample bar range; starts where the in-sample range ends.
    pub out_of_sample: Range<usize>,
    /// Whether the out-of-sample range was truncated by the end of the series.
    pub partial: bool,
    /// Timestamp of the first in-sample bar.
    pub in_sample_start: DateTime<Utc>,
    /// Timestamp of the last in-sample bar.
    pub in_sample_end: DateTime<Utc>,
    /// Timestamp of the first out-of-sample bar.
    pub out_of_sample_start: DateTime<Utc>,
    /// Timestamp of the last out-of-sample bar.
    pub out_of_sample_end: DateTime<Utc>,
}

/// Outcome of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStatus {
    /// A winner was chosen and evaluated out of sample.
    Completed,
    /// Every in-sample candidate failed.
    NoValidCandidates,
    /// The winner failed on the out-of-sample slice.
    OutOfSampleFailed,
}

/// Result of optimizing and testing one window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowResult {
    /// The split.
    pub window: Window,
    /// Winning parameters, absent when no candidate succeeded.
    pub chosen_params: Option<Parameters>,
    /// In-sample metrics of the winner.
    pub in_sample_metrics: Metrics,
    /// Out-of-sample metrics of the winner.
    pub out_of_sample_metrics: Metrics,
    /// Outcome.
    pub status: WindowStatus,
    /// Candidates run in sample.
    pub candidates_evaluated: usize,
    /// Candidates that failed in sample.
    pub candidates_failed: usize,
    /// Out-of-sample failure reason, if any.
    pub error: Option<String>,
    /// Out-of-sample equity curve of the winner.
    #[serde(skip_serializing)]
    pub out_of_sample_curve: Option<EquityCurve>,
}

impl WindowResult {
    /// Check if the window contributes to the aggregate.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == WindowStatus::Completed
    }

    /// Calculate the Sharpe ratio degradation between in-sample and out-of-sample.
    /// Returns the fractional drop (e.g., 0.5 = 50% degradation).
    #[must_use]
    pub fn sharpe_degradation(&self) -> Option<Decimal> {
        if !self.is_completed() {
            return None;
        }
        let is_sharpe = self.in_sample_metrics.sharpe_ratio;
        let oos_sharpe = self.out_of_sample_metrics.sharpe_ratio;

        if is_sharpe == Decimal::ZERO {
            return None;
        }

        Some((is_sharpe - oos_sharpe) / is_sharpe.abs())
    }

    /// Check if this window shows signs of overfitting.
    #[must_use]
    pub fn is_overfit(&self, threshold: Decimal) -> bool {
        self.sharpe_degradation().is_some_and(|d| d > threshold)
    }
}

/// Overfitting detection analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverfittingAnalysis {
    /// Median in-sample Sharpe of the chosen candidates.
    pub median_in_sample_sharpe: Decimal,
    /// Sharpe of the aggregate out-of-sample curve.
    pub out_of_sample_sharpe: Decimal,
    /// `max(0, 1 - oos_sharpe / (|median_is_sharpe| + 1e-9))`.
    pub overfit_risk: Decimal,
    /// Average Sharpe degradation across windows.
    pub avg_sharpe_degradation: Option<Decimal>,
    /// Number of windows whose degradation exceeds the threshold.
    pub overfit_windows: usize,
    /// Completed windows analyzed.
    pub total_windows: usize,
    /// Warning message if overfitting detected.
    pub warning: Option<String>,
}

/// Parameter stability analysis across windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterStability {
    /// Distinct parameter sets chosen.
    pub distinct_parameter_sets: usize,
    /// Most frequently chosen set (smallest on ties).
    pub most_frequent: Option<Parameters>,
    /// How many windows chose it.
    pub most_frequent_count: usize,
    /// `most_frequent_count / completed windows` (0 = unstable, 1 = stable).
    pub stability_score: Decimal,
    /// Warning if parameters are unstable.
    pub warning: Option<String>,
}

/// Results of walk-forward optimization.
#[derive(Debug, Clone, Serialize)]
pub struct WalkForwardReport {
    /// Strategy name.
    pub strategy: String,
    /// Configuration used.
    pub config: WalkForwardConfig,
    /// Window results in index order.
    pub windows: Vec<WindowResult>,
    /// Metrics of the aggregate out-of-sample curve.
    pub aggregate_metrics: Metrics,
    /// Re-based concatenation of the completed windows' out-of-sample curves.
    pub aggregate_curve: EquityCurve,
    /// Overfitting analysis.
    pub overfitting: OverfittingAnalysis,
    /// Parameter stability analysis.
    pub parameter_stability: ParameterStability,
    /// In-sample candidates that failed, over all windows.
    pub failed_candidates: usize,
    /// Whether the run stopped early; later windows are missing.
    pub cancelled: bool,
}

impl WalkForwardReport {
    /// Windows that contribute to the aggregate.
    pub fn completed_windows(&self) -> impl Iterator<Item = &WindowResult> {
        self.windows.iter().filter(|w| w.is_completed())
    }
}
