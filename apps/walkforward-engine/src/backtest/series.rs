//! Validated, time-ordered OHLC(V) price series.

use std::ops::Range;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Minimum number of bars accepted by [`PriceSeries::new`].
pub const MIN_SERIES_LEN: usize = 2;

/// One OHLC(V) sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp.
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume, when the source provides it.
    #[serde(default)]
    pub volume: Option<Decimal>,
}

impl Bar {
    /// Create a bar without volume.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// Attach a volume figure.
    #[must_use]
    pub const fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// An immutable, validated sequence of bars in strictly increasing time order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate and wrap a sequence of bars.
    ///
    /// Bars are never reordered or repaired: any violation is reported.
    pub fn new(bars: Vec<Bar>) -> Result<Self, DataError> {
        if bars.len() < MIN_SERIES_LEN {
            return Err(DataError::TooShort {
                len: bars.len(),
                minimum: MIN_SERIES_LEN,
            });
        }

        for (index, bar) in bars.iter().enumerate() {
            validate_bar(index, bar)?;
        }

        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(DataError::NonMonotonicTimestamp {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }

        Ok(Self { bars })
    }

    /// All bars.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Borrow a contiguous index range of bars.
    ///
    /// The range is clamped to the series bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &[Bar] {
        let end = range.end.min(self.bars.len());
        let start = range.start.min(end);
        &self.bars[start..end]
    }

    /// First bar timestamp.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.bars[0].timestamp
    }

    /// Last bar timestamp.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.bars[self.bars.len() - 1].timestamp
    }
}

fn validate_bar(index: usize, bar: &Bar) -> Result<(), DataError> {
    for (field, value) in [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
    ] {
        if value <= Decimal::ZERO {
            return Err(DataError::NonPositivePrice {
                index,
                field,
                value,
            });
        }
    }

    if bar.high < bar.low {
        return Err(DataError::InvertedRange {
            index,
            high: bar.high,
            low: bar.low,
        });
    }

    if let Some(volume) = bar.volume
        && volume < Decimal::ZERO
    {
        return Err(DataError::NegativeVolume { index, volume });
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use super::fixtures::bars_from_closes;
    use super::*;

    #[test]
    fn test_valid_series() {
        let series = PriceSeries::new(bars_from_closes(&[dec!(10), dec!(11), dec!(12)])).unwrap();
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert!(series.start() < series.end());
    }

    #[test]
    fn test_too_short() {
        let err = PriceSeries::new(bars_from_closes(&[dec!(10)])).unwrap_err();
        assert_eq!(err, DataError::TooShort { len: 1, minimum: 2 });
    }

    #[test]
    fn test_non_monotonic_timestamps_rejected() {
        let mut bars = bars_from_closes(&[dec!(10), dec!(11), dec!(12)]);
        bars[2].timestamp = bars[1].timestamp;
        let err = PriceSeries::new(bars).unwrap_err();
        assert!(matches!(err, DataError::NonMonotonicTimestamp { index: 2, .. }));
    }

    #[test]
    fn test_out_of_order_not_repaired() {
        let mut bars = bars_from_closes(&[dec!(10), dec!(11), dec!(12)]);
        bars[0].timestamp += Duration::days(10);
        assert!(PriceSeries::new(bars).is_err());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut bars = bars_from_closes(&[dec!(10), dec!(11)]);
        bars[1].low = Decimal::ZERO;
        let err = PriceSeries::new(bars).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonPositivePrice {
                index: 1,
                field: "low",
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut bars = bars_from_closes(&[dec!(10), dec!(11)]);
        bars[0].high = dec!(5);
        assert!(matches!(
            PriceSeries::new(bars),
            Err(DataError::InvertedRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_negative_volume_rejected() {
        let mut bars = bars_from_closes(&[dec!(10), dec!(11)]);
        bars[1] = bars[1].clone().with_volume(dec!(-5));
        assert!(matches!(
            PriceSeries::new(bars),
            Err(DataError::NegativeVolume { index: 1, .. })
        ));
    }

    #[test]
    fn test_slice_is_clamped() {
        let series = PriceSeries::new(bars_from_closes(&[dec!(1), dec!(2), dec!(3)])).unwrap();
        assert_eq!(series.slice(1..10).len(), 2);
        assert!(series.slice(5..10).is_empty());
    }
}
