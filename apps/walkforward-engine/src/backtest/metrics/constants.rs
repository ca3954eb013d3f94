//! Decimal constants for performance metric calculations.

use rust_decimal::Decimal;

pub const TWO: Decimal = Decimal::TWO;
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
pub const TRADING_DAYS: u32 = 252;
/// Upper bound on Newton iterations for square roots.
pub const SQRT_MAX_ITERATIONS: usize = 100;
