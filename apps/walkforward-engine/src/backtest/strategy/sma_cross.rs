//! Simple moving-average crossover.

use crate::backtest::parallel::Parameters;
use crate::backtest::position::Position;
use crate::backtest::series::Bar;

use super::{Strategy, StrategyError, require_int, trailing_close_mean};

/// Long while the fast SMA is above the slow SMA, short while below.
///
/// Parameters: `fast` and `slow` window lengths (integers, at least 1). Early
/// bars average over whatever history exists, so a signal is available from
/// the first bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmaCross;

impl Strategy for SmaCross {
    fn name(&self) -> &str {
        "sma_cross"
    }

    fn validate(&self, params: &Parameters) -> Result<(), StrategyError> {
        require_int(params, "fast", 1)?;
        require_int(params, "slow", 1)?;
        Ok(())
    }

    fn decide(&self, history: &[Bar], params: &Parameters) -> Result<Position, StrategyError> {
        let fast = require_int(params, "fast", 1)?;
        let slow = require_int(params, "slow", 1)?;

        let (Some(fast_sma), Some(slow_sma)) = (
            trailing_close_mean(history, fast),
            trailing_close_mean(history, slow),
        ) else {
            return Ok(Position::Flat);
        };

        Ok(match fast_sma.cmp(&slow_sma) {
            std::cmp::Ordering::Greater => Position::Long,
            std::cmp::Ordering::Less => Position::Short,
            std::cmp::Ordering::Equal => Position::Flat,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::series::fixtures::bars_from_closes;

    fn params(fast: i64, slow: i64) -> Parameters {
        Parameters::new().with("fast", fast).with("slow", slow)
    }

    #[test]
    fn test_uptrend_goes_long() {
        let bars = bars_from_closes(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
        assert_eq!(SmaCross.decide(&bars, &params(2, 4)), Ok(Position::Long));
    }

    #[test]
    fn test_downtrend_goes_short() {
        let bars = bars_from_closes(&[dec!(5), dec!(4), dec!(3), dec!(2), dec!(1)]);
        assert_eq!(SmaCross.decide(&bars, &params(2, 4)), Ok(Position::Short));
    }

    #[test]
    fn test_single_bar_is_flat() {
        let bars = bars_from_closes(&[dec!(5), dec!(6)]);
        assert_eq!(SmaCross.decide(&bars[..1], &params(2, 4)), Ok(Position::Flat));
    }

    #[test]
    fn test_rejects_zero_window() {
        assert!(SmaCross.validate(&params(0, 4)).is_err());
        assert!(SmaCross.validate(&Parameters::new().with("fast", 2)).is_err());
        assert!(SmaCross.validate(&params(2, 4)).is_ok());
    }
}
