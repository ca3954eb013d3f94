//! Bar-by-bar simulation engine.
//!
//! # Execution model
//!
//! At bar `i` the engine:
//! 1. fills the order pending from bar `i - 1` at bar `i`'s open,
//! 2. asks the strategy for a target using `bars[..=i]` only,
//! 3. marks equity at bar `i`'s close.
//!
//! A decision therefore takes effect on the bar after it was made, and the
//! strategy never sees a bar it could not have observed. Positions are sized
//! with the full equity at fill time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::commission::{calculate_fill_cost, size_entry};
use super::config::BacktestConfig;
use super::metrics::{EquityCurve, EquityPoint};
use super::parallel::Parameters;
use super::position::Position;
use super::series::{Bar, PriceSeries};
use super::strategy::Strategy;
use super::trade::Trade;
use crate::error::{ConfigurationError, SimulationError};

/// Simulation engine for single-asset backtests.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

/// The currently held leg.
#[derive(Debug, Clone)]
struct OpenLeg {
    direction: Position,
    entry_timestamp: DateTime<Utc>,
    entry_price: Decimal,
    units: Decimal,
    entry_cost: Decimal,
}

impl OpenLeg {
    fn unrealized(&self, price: Decimal) -> Decimal {
        self.units * (price - self.entry_price)
    }

    fn into_trade(
        self,
        exit_timestamp: DateTime<Utc>,
        exit_price: Decimal,
        exit_cost: Decimal,
    ) -> Trade {
        let gross = self.unrealized(exit_price);
        let costs = self.entry_cost + exit_cost;
        Trade {
            direction: self.direction,
            entry_timestamp: self.entry_timestamp,
            exit_timestamp,
            entry_price: self.entry_price,
            exit_price,
            units: self.units,
            costs,
            pnl: gross - costs,
        }
    }
}

/// Mutable state of one run.
struct Book<'a> {
    config: &'a BacktestConfig,
    capital: Decimal,
    leg: Option<OpenLeg>,
    trades: Vec<Trade>,
}

impl Book<'_> {
    fn held(&self) -> Position {
        self.leg.as_ref().map_or(Position::Flat, |leg| leg.direction)
    }

    fn equity_at(&self, price: Decimal) -> Decimal {
        self.capital + self.leg.as_ref().map_or(Decimal::ZERO, |leg| leg.unrealized(price))
    }

    fn close(&mut self, timestamp: DateTime<Utc>, price: Decimal) {
        let Some(leg) = self.leg.take() else {
            return;
        };
        let exit_cost = calculate_fill_cost(&self.config.cost, leg.units, price);
        self.capital += leg.unrealized(price) - exit_cost;
        let trade = leg.into_trade(timestamp, price, exit_cost);
        trace!(
            direction = ?trade.direction,
            entry = %trade.entry_timestamp,
            exit = %trade.exit_timestamp,
            hours = trade.holding_period_hours(),
            gross = %trade.gross_pnl(),
            pnl = %trade.pnl,
            "Trade closed"
        );
        self.trades.push(trade);
    }

    fn open(&mut self, direction: Position, timestamp: DateTime<Utc>, price: Decimal) {
        let Some((invested, entry_cost)) = size_entry(&self.config.cost, self.capital) else {
            debug!(capital = %self.capital, "Insufficient capital to open position");
            return;
        };
        self.capital -= entry_cost;
        self.leg = Some(OpenLeg {
            direction,
            entry_timestamp: timestamp,
            entry_price: price,
            units: direction.exposure() * invested / price,
            entry_cost,
        });
    }
}

impl BacktestEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: BacktestConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Simulate `strategy` over a validated series.
    pub fn run_series(
        &self,
        series: &PriceSeries,
        strategy: &dyn Strategy,
        params: &Parameters,
    ) -> Result<EquityCurve, SimulationError> {
        self.run(series.bars(), strategy, params)
    }

    /// Simulate `strategy` over `bars`.
    ///
    /// Produces one equity point per bar after the warm-up. Bar indices in
    /// errors are relative to `bars`.
    pub fn run(
        &self,
        bars: &[Bar],
        strategy: &dyn Strategy,
        params: &Parameters,
    ) -> Result<EquityCurve, SimulationError> {
        strategy
            .validate(params)
            .map_err(|e| SimulationError::InvalidParameters {
                strategy: strategy.name().to_string(),
                parameters: params.to_string(),
                message: e.message,
            })?;

        let mut curve = EquityCurve::new(self.config.initial_equity);
        let start = self.config.warm_up_bars;
        if bars.len() <= start {
            debug!(
                strategy = strategy.name(),
                bars = bars.len(),
                warm_up = start,
                "Series shorter than warm-up, nothing to simulate"
            );
            return Ok(curve);
        }

        let last = bars.len() - 1;
        let mut book = Book {
            config: &self.config,
            capital: self.config.initial_equity,
            leg: None,
            trades: Vec::new(),
        };
        let mut pending: Option<Position> = None;
        curve.points.reserve(bars.len() - start);

        for (i, bar) in bars.iter().enumerate().skip(start) {
            if let Some(target) = pending.take() {
                book.close(bar.timestamp, bar.open);
                // An entry on the final bar would be force-closed at the same timestamp
                let skip_entry = i == last && self.config.close_at_end;
                if !target.is_flat() && !skip_entry {
                    book.open(target, bar.timestamp, bar.open);
                }
            }

            let target = strategy.decide(&bars[..=i], params).map_err(|e| {
                SimulationError::StrategyFailed {
                    strategy: strategy.name().to_string(),
                    bar_index: i,
                    message: e.message,
                }
            })?;
            if target == Position::Short && !self.config.allow_short {
                return Err(SimulationError::ShortNotAllowed {
                    strategy: strategy.name().to_string(),
                    bar_index: i,
                });
            }
            if i < last && target != book.held() {
                pending = Some(target);
            }

            curve.points.push(EquityPoint {
                timestamp: bar.timestamp,
                equity: book.equity_at(bar.close),
                position: book.held(),
            });
        }

        let final_bar = &bars[last];
        if self.config.close_at_end {
            book.close(final_bar.timestamp, final_bar.close);
            if let Some(point) = curve.points.last_mut() {
                point.equity = book.capital;
            }
        } else if let Some(leg) = book.leg.take() {
            curve.open_trade =
                Some(leg.into_trade(final_bar.timestamp, final_bar.close, Decimal::ZERO));
        }

        curve.trades = book.trades;
        debug!(
            strategy = strategy.name(),
            params = %params,
            bars = curve.points.len(),
            trades = curve.trades.len(),
            final_equity = %curve.final_equity(),
            "Backtest run complete"
        );
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::backtest::config::TransactionCost;
    use crate::backtest::series::fixtures::bars_from_closes;
    use crate::backtest::strategy::StrategyError;

    #[derive(Debug)]
    struct Fixed(Position);

    impl Strategy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn decide(&self, _history: &[Bar], _params: &Parameters) -> Result<Position, StrategyError> {
            Ok(self.0)
        }
    }

    /// Long once the history holds more than `after` bars.
    #[derive(Debug)]
    struct LongAfter(usize);

    impl Strategy for LongAfter {
        fn name(&self) -> &str {
            "long_after"
        }

        fn decide(&self, history: &[Bar], _params: &Parameters) -> Result<Position, StrategyError> {
            Ok(if history.len() > self.0 {
                Position::Long
            } else {
                Position::Flat
            })
        }
    }

    /// Long on even bars, short on odd bars.
    #[derive(Debug)]
    struct Flip;

    impl Strategy for Flip {
        fn name(&self) -> &str {
            "flip"
        }

        fn decide(&self, history: &[Bar], _params: &Parameters) -> Result<Position, StrategyError> {
            Ok(if history.len() % 2 == 0 {
                Position::Short
            } else {
                Position::Long
            })
        }
    }

    #[derive(Debug)]
    struct FailsAt(usize);

    impl Strategy for FailsAt {
        fn name(&self) -> &str {
            "fails_at"
        }

        fn validate(&self, params: &Parameters) -> Result<(), StrategyError> {
            if params.get("reject").is_some() {
                return Err(StrategyError::new("rejected"));
            }
            Ok(())
        }

        fn decide(&self, history: &[Bar], _params: &Parameters) -> Result<Position, StrategyError> {
            if history.len() > self.0 {
                return Err(StrategyError::new("boom"));
            }
            Ok(Position::Flat)
        }
    }

    fn zero_cost_engine() -> BacktestEngine {
        BacktestEngine::new(BacktestConfig {
            cost: TransactionCost::zero(),
            ..Default::default()
        })
        .unwrap()
    }

    fn rising_bars() -> Vec<Bar> {
        bars_from_closes(&[dec!(100), dec!(102), dec!(105), dec!(104), dec!(110), dec!(120)])
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BacktestConfig {
            initial_equity: dec!(0),
            ..Default::default()
        };
        assert!(BacktestEngine::new(config).is_err());
    }

    #[test]
    fn test_shorter_than_warm_up_is_empty() {
        let engine = BacktestEngine::new(BacktestConfig {
            warm_up_bars: 10,
            ..Default::default()
        })
        .unwrap();
        let curve = engine
            .run(&rising_bars(), &Fixed(Position::Long), &Parameters::new())
            .unwrap();
        assert!(curve.is_empty());
        assert!(curve.trades.is_empty());
        assert_eq!(curve.final_equity(), dec!(10000));
    }

    #[test]
    fn test_one_point_per_bar_after_warm_up() {
        let engine = BacktestEngine::new(BacktestConfig {
            warm_up_bars: 2,
            ..Default::default()
        })
        .unwrap();
        let bars = rising_bars();
        let curve = engine.run(&bars, &Fixed(Position::Long), &Parameters::new()).unwrap();
        assert_eq!(curve.points.len(), bars.len() - 2);
        assert_eq!(curve.points[0].timestamp, bars[2].timestamp);
    }

    #[test]
    fn test_always_long_matches_buy_and_hold() {
        let bars = rising_bars();
        let curve = zero_cost_engine()
            .run(&bars, &Fixed(Position::Long), &Parameters::new())
            .unwrap();

        assert_eq!(curve.trades.len(), 1);
        let trade = &curve.trades[0];
        assert_eq!(trade.entry_timestamp, bars[1].timestamp);
        assert_eq!(trade.entry_price, dec!(100));
        assert_eq!(trade.exit_price, dec!(120));
        assert_eq!(curve.final_equity(), dec!(12000));
        assert_eq!(trade.pnl, dec!(2000));
        // Flat on the signal bar, long afterwards
        assert_eq!(curve.points[0].position, Position::Flat);
        assert_eq!(curve.points[1].position, Position::Long);
    }

    #[test]
    fn test_entry_is_on_the_bar_after_the_signal() {
        let bars = rising_bars();
        let curve = zero_cost_engine()
            .run(&bars, &LongAfter(3), &Parameters::new())
            .unwrap();
        // First Long decision at bar 3, filled at bar 4's open
        assert_eq!(curve.trades[0].entry_timestamp, bars[4].timestamp);
        assert_eq!(curve.points[3].position, Position::Flat);
        assert_eq!(curve.points[4].position, Position::Long);
    }

    #[test]
    fn test_no_entry_on_final_bar_when_closing_at_end() {
        let bars = rising_bars();
        // Long decided on the penultimate bar only
        let curve = zero_cost_engine()
            .run(&bars, &LongAfter(bars.len() - 2), &Parameters::new())
            .unwrap();
        assert!(curve.trades.is_empty());
        assert!(curve.open_trade.is_none());
        assert_eq!(curve.final_equity(), dec!(10000));
    }

    #[test]
    fn test_every_trade_exits_after_entry() {
        let bars = rising_bars();
        let curve = zero_cost_engine().run(&bars, &Flip, &Parameters::new()).unwrap();
        assert!(!curve.trades.is_empty());
        for trade in &curve.trades {
            assert!(trade.entry_timestamp < trade.exit_timestamp);
        }
    }

    #[test]
    fn test_short_profits_from_decline() {
        let bars = bars_from_closes(&[dec!(100), dec!(100), dec!(90), dec!(80)]);
        let curve = zero_cost_engine()
            .run(&bars, &Fixed(Position::Short), &Parameters::new())
            .unwrap();
        let trade = &curve.trades[0];
        assert!(trade.units < Decimal::ZERO);
        assert_eq!(trade.pnl, dec!(2000));
        assert_eq!(curve.final_equity(), dec!(12000));
    }

    #[test]
    fn test_short_rejected_when_disabled() {
        let engine = BacktestEngine::new(BacktestConfig {
            allow_short: false,
            ..Default::default()
        })
        .unwrap();
        let result = engine.run(&rising_bars(), &Fixed(Position::Short), &Parameters::new());
        assert!(matches!(
            result,
            Err(SimulationError::ShortNotAllowed { bar_index: 0, .. })
        ));
    }

    #[test]
    fn test_costs_reduce_equity() {
        let engine = BacktestEngine::new(BacktestConfig {
            cost: TransactionCost::rate(dec!(0.01)),
            ..Default::default()
        })
        .unwrap();
        let bars = bars_from_closes(&[dec!(50); 5]);
        let curve = engine.run(&bars, &Fixed(Position::Long), &Parameters::new()).unwrap();

        let trade = &curve.trades[0];
        assert!(trade.costs > Decimal::ZERO);
        assert_eq!(trade.pnl, -trade.costs);
        assert!((curve.final_equity() - (dec!(10000) + trade.pnl)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_open_trade_reported_without_close_at_end() {
        let engine = BacktestEngine::new(BacktestConfig {
            close_at_end: false,
            cost: TransactionCost::zero(),
            ..Default::default()
        })
        .unwrap();
        let curve = engine
            .run(&rising_bars(), &Fixed(Position::Long), &Parameters::new())
            .unwrap();
        assert!(curve.trades.is_empty());
        let Some(open) = curve.open_trade else {
            panic!("trade should remain open");
        };
        assert_eq!(open.pnl, dec!(2000));
    }

    #[test]
    fn test_strategy_failure_aborts_run() {
        let result = zero_cost_engine().run(&rising_bars(), &FailsAt(2), &Parameters::new());
        assert!(matches!(
            result,
            Err(SimulationError::StrategyFailed { bar_index: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let params = Parameters::new().with("reject", true);
        let result = zero_cost_engine().run(&rising_bars(), &FailsAt(100), &params);
        assert!(matches!(result, Err(SimulationError::InvalidParameters { .. })));
    }
}
