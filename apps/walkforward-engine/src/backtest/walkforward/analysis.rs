//! Aggregation and robustness analysis over window results.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::types::{OverfittingAnalysis, ParameterStability, WindowResult};
use crate::backtest::metrics::{EquityCurve, Metrics};
use crate::backtest::parallel::Parameters;

/// Added to the in-sample Sharpe magnitude before dividing.
const OVERFIT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Stability below this score is flagged.
const STABILITY_WARNING_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Concatenate the out-of-sample curves of completed windows.
///
/// Each segment is re-based so that it starts from the running final equity,
/// beginning at `initial_equity`.
#[must_use]
pub fn aggregate_curve(initial_equity: Decimal, windows: &[WindowResult]) -> EquityCurve {
    let mut aggregate = EquityCurve::new(initial_equity);
    for curve in windows
        .iter()
        .filter(|w| w.is_completed())
        .filter_map(|w| w.out_of_sample_curve.as_ref())
    {
        aggregate.append_rebased(curve);
    }
    aggregate
}

/// Analyze overfitting across completed windows.
#[must_use]
pub fn analyze_overfitting(
    windows: &[WindowResult],
    aggregate: &Metrics,
    threshold: Decimal,
) -> OverfittingAnalysis {
    let completed: Vec<&WindowResult> = windows.iter().filter(|w| w.is_completed()).collect();
    if completed.is_empty() {
        return OverfittingAnalysis::default();
    }

    let in_sample_sharpes: Vec<Decimal> = completed
        .iter()
        .map(|w| w.in_sample_metrics.sharpe_ratio)
        .collect();
    let median_in_sample_sharpe = median(&in_sample_sharpes).unwrap_or(Decimal::ZERO);
    let out_of_sample_sharpe = aggregate.sharpe_ratio;

    let overfit_risk = out_of_sample_sharpe
        .checked_div(median_in_sample_sharpe.abs() + OVERFIT_EPSILON)
        .map_or(Decimal::ZERO, |ratio| (Decimal::ONE - ratio).max(Decimal::ZERO));

    let degradations: Vec<Decimal> = completed
        .iter()
        .filter_map(|w| w.sharpe_degradation())
        .collect();
    let avg_sharpe_degradation = if degradations.is_empty() {
        None
    } else {
        let sum: Decimal = degradations.iter().sum();
        Some(sum / Decimal::from(degradations.len() as u64))
    };
    let overfit_windows = completed.iter().filter(|w| w.is_overfit(threshold)).count();

    let n = completed.len();
    let warning = if overfit_windows > 0 {
        Some(format!(
            "{}/{} windows show >{}% Sharpe degradation",
            overfit_windows,
            n,
            (threshold * Decimal::ONE_HUNDRED).round_dp(0)
        ))
    } else {
        None
    };

    OverfittingAnalysis {
        median_in_sample_sharpe,
        out_of_sample_sharpe,
        overfit_risk,
        avg_sharpe_degradation,
        overfit_windows,
        total_windows: n,
        warning,
    }
}

/// Analyze how consistently the same parameters win across completed windows.
#[must_use]
pub fn analyze_parameter_stability(windows: &[WindowResult]) -> ParameterStability {
    let mut counts: BTreeMap<&Parameters, usize> = BTreeMap::new();
    let mut completed = 0usize;
    for params in windows
        .iter()
        .filter(|w| w.is_completed())
        .filter_map(|w| w.chosen_params.as_ref())
    {
        *counts.entry(params).or_default() += 1;
        completed += 1;
    }

    if completed == 0 {
        return ParameterStability::default();
    }

    // Ascending key order, so the first maximum is the smallest set
    let mut most_frequent: Option<(&Parameters, usize)> = None;
    for (params, count) in &counts {
        if most_frequent.is_none_or(|(_, best)| *count > best) {
            most_frequent = Some((params, *count));
        }
    }
    let (most_frequent, most_frequent_count) =
        most_frequent.map_or((None, 0), |(p, c)| (Some(p.clone()), c));

    let stability_score =
        Decimal::from(most_frequent_count as u64) / Decimal::from(completed as u64);

    let warning = if stability_score < STABILITY_WARNING_THRESHOLD {
        Some(format!(
            "Chosen parameters vary across windows: {} distinct sets in {} windows",
            counts.len(),
            completed
        ))
    } else {
        None
    };

    ParameterStability {
        distinct_parameter_sets: counts.len(),
        most_frequent,
        most_frequent_count,
        stability_score,
        warning,
    }
}

/// Median of a slice of decimals.
#[must_use]
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / Decimal::TWO)
    } else {
        Some(sorted[mid])
    }
}
