//! Formatting utilities for metric log lines.

use rust_decimal::Decimal;

use super::constants::HUNDRED;

/// Format a fraction as a percentage string.
#[must_use]
pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}%", value * HUNDRED)
}

/// Format a ratio with 2 decimal places.
#[must_use]
pub fn format_ratio(value: Decimal) -> String {
    format!("{value:.2}")
}
