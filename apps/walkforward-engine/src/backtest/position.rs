//! Discrete position signals produced by strategies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Target position for the next bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Fully invested long.
    Long,
    /// Fully invested short.
    Short,
    /// No exposure.
    #[default]
    Flat,
}

impl Position {
    /// Convert a raw `-1 / 0 / 1` signal into a position.
    ///
    /// Any other value is not a valid signal.
    #[must_use]
    pub const fn from_signal(signal: i64) -> Option<Self> {
        match signal {
            1 => Some(Self::Long),
            0 => Some(Self::Flat),
            -1 => Some(Self::Short),
            _ => None,
        }
    }

    /// Signed exposure: 1 for long, -1 for short, 0 when flat.
    #[must_use]
    pub const fn exposure(self) -> Decimal {
        match self {
            Self::Long => Decimal::ONE,
            Self::Short => Decimal::NEGATIVE_ONE,
            Self::Flat => Decimal::ZERO,
        }
    }

    /// Check if the position carries no exposure.
    #[must_use]
    pub const fn is_flat(self) -> bool {
        matches!(self, Self::Flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_signal() {
        assert_eq!(Position::from_signal(1), Some(Position::Long));
        assert_eq!(Position::from_signal(0), Some(Position::Flat));
        assert_eq!(Position::from_signal(-1), Some(Position::Short));
        assert_eq!(Position::from_signal(2), None);
    }

    #[test]
    fn test_exposure() {
        assert_eq!(Position::Long.exposure(), Decimal::ONE);
        assert_eq!(Position::Short.exposure(), Decimal::NEGATIVE_ONE);
        assert!(Position::Flat.is_flat());
        assert!(!Position::Short.is_flat());
    }
}
