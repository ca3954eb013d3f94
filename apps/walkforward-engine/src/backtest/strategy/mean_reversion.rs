//! Z-score mean reversion.

use rust_decimal::Decimal;

use crate::backtest::metrics::math::{mean, std_dev};
use crate::backtest::parallel::Parameters;
use crate::backtest::position::Position;
use crate::backtest::series::Bar;

use super::{Strategy, StrategyError, require_int, require_positive};

/// Fades moves away from the rolling mean.
///
/// The z-score of the current close is taken against the mean and sample
/// standard deviation of the last `lookback` closes (fewer early on). Long
/// when `z < -entry_z`, short when `z > entry_z`, flat otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversion;

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn validate(&self, params: &Parameters) -> Result<(), StrategyError> {
        require_int(params, "lookback", 2)?;
        require_positive(params, "entry_z")?;
        Ok(())
    }

    fn decide(&self, history: &[Bar], params: &Parameters) -> Result<Position, StrategyError> {
        let lookback = require_int(params, "lookback", 2)?;
        let entry_z = require_positive(params, "entry_z")?;

        let Some(current) = history.last() else {
            return Ok(Position::Flat);
        };
        let closes: Vec<Decimal> = history[history.len().saturating_sub(lookback)..]
            .iter()
            .map(|b| b.close)
            .collect();

        let (Some(avg), Some(std)) = (mean(&closes), std_dev(&closes)) else {
            return Ok(Position::Flat);
        };
        if std == Decimal::ZERO {
            return Ok(Position::Flat);
        }

        let z = (current.close - avg) / std;
        if z < -entry_z {
            Ok(Position::Long)
        } else if z > entry_z {
            Ok(Position::Short)
        } else {
            Ok(Position::Flat)
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::series::fixtures::bars_from_closes;

    fn params(lookback: i64, entry_z: Decimal) -> Parameters {
        Parameters::new()
            .with("lookback", lookback)
            .with("entry_z", entry_z)
    }

    #[test]
    fn test_spike_up_goes_short() {
        let bars = bars_from_closes(&[dec!(10), dec!(10.1), dec!(9.9), dec!(10), dec!(12)]);
        assert_eq!(
            MeanReversion.decide(&bars, &params(5, dec!(1))),
            Ok(Position::Short)
        );
    }

    #[test]
    fn test_drop_goes_long() {
        let bars = bars_from_closes(&[dec!(10), dec!(10.1), dec!(9.9), dec!(10), dec!(8)]);
        assert_eq!(
            MeanReversion.decide(&bars, &params(5, dec!(1))),
            Ok(Position::Long)
        );
    }

    #[test]
    fn test_constant_prices_are_flat() {
        let bars = bars_from_closes(&[dec!(10); 6]);
        assert_eq!(
            MeanReversion.decide(&bars, &params(4, dec!(0.5))),
            Ok(Position::Flat)
        );
    }

    #[test]
    fn test_validation() {
        assert!(MeanReversion.validate(&params(1, dec!(1))).is_err());
        assert!(MeanReversion.validate(&params(5, dec!(0))).is_err());
        assert!(MeanReversion.validate(&params(5, dec!(1.5))).is_ok());
    }
}
