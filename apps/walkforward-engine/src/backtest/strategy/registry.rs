//! Name-based strategy lookup for the binary.

use std::sync::Arc;

use super::{Breakout, MeanReversion, SmaCross, Strategy};

/// Names of all registered strategies.
pub const STRATEGY_NAMES: [&str; 3] = ["sma_cross", "breakout", "mean_reversion"];

/// Resolve a strategy by its registry name.
#[must_use]
pub fn by_name(name: &str) -> Option<Arc<dyn Strategy>> {
    match name {
        "sma_cross" => Some(Arc::new(SmaCross)),
        "breakout" => Some(Arc::new(Breakout)),
        "mean_reversion" => Some(Arc::new(MeanReversion)),
        _ => None,
    }
}
