//! Backtest configuration types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Transaction cost model, charged on every fill (entry and exit).
///
/// cost = notional × `rate` + `fixed_fee`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionCost {
    /// Fraction of traded notional (0.001 = 10 bps).
    pub rate: Decimal,
    /// Flat fee per fill, in equity units.
    pub fixed_fee: Decimal,
}

impl Default for TransactionCost {
    fn default() -> Self {
        Self {
            rate: Decimal::ZERO,
            fixed_fee: Decimal::ZERO,
        }
    }
}

impl TransactionCost {
    /// Cost-free fills.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            rate: Decimal::ZERO,
            fixed_fee: Decimal::ZERO,
        }
    }

    /// Percentage-of-notional cost only.
    #[must_use]
    pub const fn rate(rate: Decimal) -> Self {
        Self {
            rate,
            fixed_fee: Decimal::ZERO,
        }
    }
}

/// Backtest simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Bars consumed before the first decision; no equity point is emitted for them.
    pub warm_up_bars: usize,
    /// Starting equity.
    pub initial_equity: Decimal,
    /// Transaction costs.
    pub cost: TransactionCost,
    /// Force-close an open trade at the final bar's close.
    ///
    /// When false the trade stays open and is marked to market only.
    pub close_at_end: bool,
    /// Whether strategies may go short.
    pub allow_short: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            warm_up_bars: 0,
            initial_equity: Decimal::new(10_000, 0),
            cost: TransactionCost::default(),
            close_at_end: true,
            allow_short: true,
        }
    }
}

impl BacktestConfig {
    /// Check the configuration for inconsistent values.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.initial_equity <= Decimal::ZERO {
            return Err(ConfigurationError::InvalidValue {
                field: "initial_equity",
                message: format!("must be positive, got {}", self.initial_equity),
            });
        }
        if self.cost.rate < Decimal::ZERO || self.cost.rate >= Decimal::ONE {
            return Err(ConfigurationError::InvalidValue {
                field: "cost.rate",
                message: format!("must be in [0, 1), got {}", self.cost.rate),
            });
        }
        if self.cost.fixed_fee < Decimal::ZERO {
            return Err(ConfigurationError::InvalidValue {
                field: "cost.fixed_fee",
                message: format!("must not be negative, got {}", self.cost.fixed_fee),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_backtest_config_default() {
        let config = BacktestConfig::default();
        assert_eq!(config.warm_up_bars, 0);
        assert_eq!(config.initial_equity, dec!(10000));
        assert_eq!(config.cost, TransactionCost::zero());
        assert!(config.close_at_end);
        assert!(config.allow_short);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_equity() {
        let config = BacktestConfig {
            initial_equity: Decimal::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue {
                field: "initial_equity",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_negative_costs() {
        let config = BacktestConfig {
            cost: TransactionCost {
                rate: dec!(-0.01),
                fixed_fee: Decimal::ZERO,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BacktestConfig {
            cost: TransactionCost {
                rate: Decimal::ZERO,
                fixed_fee: dec!(-1),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: BacktestConfig = serde_yaml_bw::from_str("warm_up_bars: 5\n").unwrap();
        assert_eq!(config.warm_up_bars, 5);
        assert_eq!(config.initial_equity, dec!(10000));
    }
}
