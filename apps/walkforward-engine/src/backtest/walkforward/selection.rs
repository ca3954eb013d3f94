//! Ranking of in-sample candidates.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backtest::metrics::Metrics;
use crate::backtest::parallel::Parameters;

/// Metric used to pick the best in-sample candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMetric {
    /// Highest Sharpe ratio.
    #[default]
    SharpeRatio,
    /// Highest Sortino ratio.
    SortinoRatio,
    /// Highest total return.
    TotalReturn,
    /// Highest win rate.
    WinRate,
    /// Lowest maximum drawdown.
    MaxDrawdown,
}

impl SelectionMetric {
    /// Score where higher is better.
    #[must_use]
    pub fn score(self, metrics: &Metrics) -> Decimal {
        match self {
            Self::SharpeRatio => metrics.sharpe_ratio,
            Self::SortinoRatio => metrics.sortino_ratio,
            Self::TotalReturn => metrics.total_return,
            Self::WinRate => metrics.win_rate,
            Self::MaxDrawdown => -metrics.max_drawdown,
        }
    }

    /// Order two candidates; `Greater` means `a` is preferred.
    ///
    /// Ties on the score go to the higher total return, then to the smaller
    /// parameter set.
    #[must_use]
    pub fn compare(self, a: (&Parameters, &Metrics), b: (&Parameters, &Metrics)) -> Ordering {
        self.score(a.1)
            .cmp(&self.score(b.1))
            .then_with(|| a.1.total_return.cmp(&b.1.total_return))
            .then_with(|| b.0.cmp(a.0))
    }

    /// Pick the preferred candidate.
    pub fn select<'a, I>(self, candidates: I) -> Option<(&'a Parameters, &'a Metrics)>
    where
        I: IntoIterator<Item = (&'a Parameters, &'a Metrics)>,
    {
        candidates.into_iter().max_by(|a, b| self.compare(*a, *b))
    }
}
