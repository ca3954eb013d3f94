//! Trade records derived by the backtest engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::position::Position;

/// A round-trip trade, or the still-open leg of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Long or short.
    pub direction: Position,
    /// Timestamp of the entry fill.
    pub entry_timestamp: DateTime<Utc>,
    /// Timestamp of the exit fill (for an open trade: the last marked bar).
    pub exit_timestamp: DateTime<Utc>,
    /// Entry fill price.
    pub entry_price: Decimal,
    /// Exit fill price (for an open trade: the last mark price).
    pub exit_price: Decimal,
    /// Signed units held (negative for shorts).
    pub units: Decimal,
    /// Transaction costs charged on entry and exit.
    pub costs: Decimal,
    /// Net P&L after costs.
    pub pnl: Decimal,
}

impl Trade {
    /// Check if this trade was profitable.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    /// Gross P&L before costs.
    #[must_use]
    pub fn gross_pnl(&self) -> Decimal {
        self.units * (self.exit_price - self.entry_price)
    }

    /// Holding period in hours.
    #[must_use]
    pub fn holding_period_hours(&self) -> i64 {
        self.exit_timestamp
            .signed_duration_since(self.entry_timestamp)
            .num_hours()
    }

    /// Copy of this trade with P&L and costs scaled by `factor`.
    ///
    /// Used when re-basing a segment of equity onto a different capital base.
    #[must_use]
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            units: self.units * factor,
            costs: self.costs * factor,
            pnl: self.pnl * factor,
            ..self.clone()
        }
    }
}
