//! Strategy contract and concrete strategies.
//!
//! A strategy maps the history observed so far plus a parameter set to a
//! target [`Position`]. The history is always a prefix slice ending at the
//! current bar, so a strategy has no way to read later bars.
//!
//! Concrete strategies:
//! - [`SmaCross`]: fast/slow simple moving-average crossover
//! - [`Breakout`]: channel breakout over the previous `lookback` bars
//! - [`MeanReversion`]: z-score fade against a rolling mean
//!
//! [`registry`] resolves strategies by name for the binary; the engine only
//! ever receives `&dyn Strategy`.

mod breakout;
mod mean_reversion;
pub mod registry;
mod sma_cross;

use std::fmt::Debug;

use rust_decimal::Decimal;
use thiserror::Error;

use super::parallel::Parameters;
use super::position::Position;
use super::series::Bar;

pub use breakout::Breakout;
pub use mean_reversion::MeanReversion;
pub use sma_cross::SmaCross;

/// Failure raised by a strategy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StrategyError {
    /// Failure reason.
    pub message: String,
}

impl StrategyError {
    /// Create an error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pluggable decision function.
pub trait Strategy: Send + Sync + Debug {
    /// Registry name.
    fn name(&self) -> &str;

    /// Check a parameter set once before a run.
    fn validate(&self, _params: &Parameters) -> Result<(), StrategyError> {
        Ok(())
    }

    /// Target position given the history up to and including the current bar.
    fn decide(&self, history: &[Bar], params: &Parameters) -> Result<Position, StrategyError>;
}

/// Fetch a required integer parameter that must be at least `minimum`.
pub(crate) fn require_int(
    params: &Parameters,
    name: &str,
    minimum: i64,
) -> Result<usize, StrategyError> {
    let value = params
        .get(name)
        .ok_or_else(|| StrategyError::new(format!("missing parameter '{name}'")))?;
    let int = value
        .as_int()
        .ok_or_else(|| StrategyError::new(format!("parameter '{name}' must be an integer")))?;
    if int < minimum {
        return Err(StrategyError::new(format!(
            "parameter '{name}' must be >= {minimum}, got {int}"
        )));
    }
    usize::try_from(int)
        .map_err(|_| StrategyError::new(format!("parameter '{name}' is out of range")))
}

/// Fetch a required numeric parameter that must be strictly positive.
pub(crate) fn require_positive(params: &Parameters, name: &str) -> Result<Decimal, StrategyError> {
    let value = params
        .get(name)
        .ok_or_else(|| StrategyError::new(format!("missing parameter '{name}'")))?
        .as_decimal()
        .ok_or_else(|| StrategyError::new(format!("parameter '{name}' must be numeric")))?;
    if value <= Decimal::ZERO {
        return Err(StrategyError::new(format!(
            "parameter '{name}' must be positive, got {value}"
        )));
    }
    Ok(value)
}

/// Mean of the closes of the last `window` bars (or all bars when fewer exist).
pub(crate) fn trailing_close_mean(history: &[Bar], window: usize) -> Option<Decimal> {
    let start = history.len().saturating_sub(window);
    let tail = &history[start..];
    if tail.is_empty() {
        return None;
    }
    let sum: Decimal = tail.iter().map(|b| b.close).sum();
    Some(sum / Decimal::from(tail.len() as u64))
}
