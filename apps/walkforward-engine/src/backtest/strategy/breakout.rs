//! Channel breakout.

use crate::backtest::parallel::Parameters;
use crate::backtest::position::Position;
use crate::backtest::series::Bar;

use super::{Strategy, StrategyError, require_int};

/// Long on a close above the highest high of the previous `lookback` bars,
/// short on a close below the lowest low, flat otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Breakout;

impl Strategy for Breakout {
    fn name(&self) -> &str {
        "breakout"
    }

    fn validate(&self, params: &Parameters) -> Result<(), StrategyError> {
        require_int(params, "lookback", 1).map(|_| ())
    }

    fn decide(&self, history: &[Bar], params: &Parameters) -> Result<Position, StrategyError> {
        let lookback = require_int(params, "lookback", 1)?;

        let Some((current, previous)) = history.split_last() else {
            return Ok(Position::Flat);
        };
        let channel = &previous[previous.len().saturating_sub(lookback)..];

        let (Some(highest), Some(lowest)) = (
            channel.iter().map(|b| b.high).max(),
            channel.iter().map(|b| b.low).min(),
        ) else {
            return Ok(Position::Flat);
        };

        if current.close > highest {
            Ok(Position::Long)
        } else if current.close < lowest {
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

    fn params(lookback: i64) -> Parameters {
        Parameters::new().with("lookback", lookback)
    }

    #[test]
    fn test_breakout_up() {
        let bars = bars_from_closes(&[dec!(10), dec!(11), dec!(10), dec!(13)]);
        assert_eq!(Breakout.decide(&bars, &params(3)), Ok(Position::Long));
    }

    #[test]
    fn test_breakout_down() {
        let bars = bars_from_closes(&[dec!(10), dec!(11), dec!(10), dec!(8)]);
        assert_eq!(Breakout.decide(&bars, &params(2)), Ok(Position::Short));
    }

    #[test]
    fn test_inside_channel_is_flat() {
        let bars = bars_from_closes(&[dec!(10), dec!(12), dec!(11)]);
        assert_eq!(Breakout.decide(&bars, &params(2)), Ok(Position::Flat));
    }

    #[test]
    fn test_no_prior_bar_is_flat() {
        let bars = bars_from_closes(&[dec!(10), dec!(12)]);
        assert_eq!(Breakout.decide(&bars[..1], &params(5)), Ok(Position::Flat));
    }
}
