//! Metrics calculator for equity curves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

use super::constants::TRADING_DAYS;
use super::math::{downside_deviation, mean, sqrt_decimal, std_dev};
use super::types::{EquityCurve, EquityPoint, Metrics};

/// Settings for metric calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Bars per year used to annualize Sharpe and Sortino.
    pub periods_per_year: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS,
        }
    }
}

impl MetricsConfig {
    /// Reject a zero annualization factor.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.periods_per_year == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "periods_per_year",
                message: "must be positive, got 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Pure reduction of an [`EquityCurve`] to [`Metrics`].
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    config: MetricsConfig,
    annualization: Decimal,
}

impl MetricsCalculator {
    /// Create a calculator.
    #[must_use]
    pub fn new(config: MetricsConfig) -> Self {
        let annualization =
            sqrt_decimal(Decimal::from(config.periods_per_year)).unwrap_or(Decimal::ZERO);
        Self {
            config,
            annualization,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Summarize a curve.
    ///
    /// Total for every input: an empty curve yields zero ratios with both
    /// equity fields set to the initial equity.
    #[must_use]
    pub fn summarize(&self, curve: &EquityCurve) -> Metrics {
        let initial_equity = curve.initial_equity;
        let final_equity = curve.final_equity();

        let total_return = if curve.points.len() >= 2 && initial_equity > Decimal::ZERO {
            final_equity / initial_equity - Decimal::ONE
        } else {
            Decimal::ZERO
        };

        let returns = period_returns(&curve.points);
        let trade_count = curve.trades.len() as u64;
        let winners = curve.trades.iter().filter(|t| t.is_winner()).count() as u64;
        let win_rate = if trade_count > 0 {
            Decimal::from(winners) / Decimal::from(trade_count)
        } else {
            Decimal::ZERO
        };

        let exposure_time = if curve.points.is_empty() {
            Decimal::ZERO
        } else {
            let held = curve.points.iter().filter(|p| !p.position.is_flat()).count();
            Decimal::from(held as u64) / Decimal::from(curve.points.len() as u64)
        };

        Metrics {
            total_return,
            max_drawdown: max_drawdown(initial_equity, &curve.points),
            sharpe_ratio: self.sharpe(&returns),
            sortino_ratio: self.sortino(&returns),
            win_rate,
            trade_count,
            exposure_time,
            initial_equity,
            final_equity,
        }
    }

    /// Sharpe = mean(r) / stdev(r) × sqrt(periods per year).
    fn sharpe(&self, returns: &[Decimal]) -> Decimal {
        let (Some(avg), Some(std)) = (mean(returns), std_dev(returns)) else {
            return Decimal::ZERO;
        };
        if std == Decimal::ZERO {
            return Decimal::ZERO;
        }
        avg / std * self.annualization
    }

    /// Sortino = mean(r) / downside deviation × sqrt(periods per year).
    fn sortino(&self, returns: &[Decimal]) -> Decimal {
        let (Some(avg), Some(downside)) = (mean(returns), downside_deviation(returns)) else {
            return Decimal::ZERO;
        };
        if downside == Decimal::ZERO {
            return Decimal::ZERO;
        }
        avg / downside * self.annualization
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(MetricsConfig::default())
    }
}

fn period_returns(points: &[EquityPoint]) -> Vec<Decimal> {
    points
        .windows(2)
        .filter(|pair| pair[0].equity > Decimal::ZERO)
        .map(|pair| pair[1].equity / pair[0].equity - Decimal::ONE)
        .collect()
}

fn max_drawdown(initial_equity: Decimal, points: &[EquityPoint]) -> Decimal {
    let mut peak = initial_equity;
    let mut max_drawdown = Decimal::ZERO;

    for point in points {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > Decimal::ZERO {
            max_drawdown = max_drawdown.max((peak - point.equity) / peak);
        }
    }

    max_drawdown
}
