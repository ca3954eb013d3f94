//! Reduction of an equity curve to summary risk/return metrics.
//!
//! Implements:
//! - Total return and maximum drawdown
//! - Sharpe ratio (annualized mean/sample stdev of per-bar returns)
//! - Sortino ratio (annualized mean/downside deviation)
//! - Win rate, trade count and time in market

mod calculator;
mod constants;
mod format;
pub(crate) mod math;
mod types;

pub use calculator::{MetricsCalculator, MetricsConfig};
pub use format::{format_pct, format_ratio};
pub use types::{EquityCurve, EquityPoint, Metrics};
