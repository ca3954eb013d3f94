//! Equity curve and metric types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backtest::position::Position;
use crate::backtest::trade::Trade;

/// Equity marked at the close of one bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Bar timestamp.
    pub timestamp: DateTime<Utc>,
    /// Equity at the bar close.
    pub equity: Decimal,
    /// Position held during the bar.
    pub position: Position,
}

/// Output of one backtest run: one point per simulated bar plus the trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityCurve {
    /// Equity before the first bar.
    pub initial_equity: Decimal,
    /// Marked equity, one point per simulated bar in order.
    pub points: Vec<EquityPoint>,
    /// Closed trades in exit order.
    pub trades: Vec<Trade>,
    /// Trade still open after the last bar, marked at the final close.
    pub open_trade: Option<Trade>,
}

impl EquityCurve {
    /// Empty curve starting at `initial_equity`.
    #[must_use]
    pub const fn new(initial_equity: Decimal) -> Self {
        Self {
            initial_equity,
            points: Vec::new(),
            trades: Vec::new(),
            open_trade: None,
        }
    }

    /// Equity at the last point, or the initial equity when empty.
    #[must_use]
    pub fn final_equity(&self) -> Decimal {
        self.points
            .last()
            .map_or(self.initial_equity, |p| p.equity)
    }

    /// Check if no bar was simulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append `segment` re-based so that it starts from this curve's final equity.
    ///
    /// Points, trade P&L and costs are scaled by
    /// `final_equity / segment.initial_equity`. The segment's open trade, if
    /// any, replaces this curve's.
    pub fn append_rebased(&mut self, segment: &Self) {
        if segment.initial_equity <= Decimal::ZERO {
            return;
        }
        let factor = self.final_equity() / segment.initial_equity;

        self.points
            .extend(segment.points.iter().map(|p| EquityPoint {
                equity: p.equity * factor,
                ..p.clone()
            }));
        self.trades
            .extend(segment.trades.iter().map(|t| t.scaled(factor)));
        if let Some(open) = &segment.open_trade {
            self.open_trade = Some(open.scaled(factor));
        }
    }
}

/// Summary metrics of one equity curve.
///
/// Ratios that are undefined (no returns, zero deviation) are reported as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Total return (decimal, e.g., 0.15 = 15%).
    pub total_return: Decimal,
    /// Maximum drawdown (positive decimal, e.g., 0.20 = 20%).
    pub max_drawdown: Decimal,
    /// Annualized Sharpe ratio.
    pub sharpe_ratio: Decimal,
    /// Annualized Sortino ratio.
    pub sortino_ratio: Decimal,
    /// Winning closed trades / closed trades.
    pub win_rate: Decimal,
    /// Number of closed trades.
    pub trade_count: u64,
    /// Fraction of points with a non-flat position.
    pub exposure_time: Decimal,
    /// Initial equity.
    pub initial_equity: Decimal,
    /// Final equity.
    pub final_equity: Decimal,
}

impl Metrics {
    /// All-zero metrics, reported for windows without a usable result.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            total_return: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            sortino_ratio: Decimal::ZERO,
            win_rate: Decimal::ZERO,
            trade_count: 0,
            exposure_time: Decimal::ZERO,
            initial_equity: Decimal::ZERO,
            final_equity: Decimal::ZERO,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::neutral()
    }
}
