//! Statistical math utilities for performance metric calculations.
//!
//! Sums run in input order and square roots use a bounded Newton iteration,
//! so results are identical across platforms.

use rust_decimal::Decimal;

use super::constants::{SQRT_MAX_ITERATIONS, TWO};

/// Calculate mean of a slice of decimals.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len() as u64))
}

/// Calculate sample standard deviation of a slice of decimals.
pub fn std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: Decimal = values.iter().map(|v| (*v - avg) * (*v - avg)).sum();
    let variance = variance_sum / Decimal::from((values.len() - 1) as u64);

    sqrt_decimal(variance)
}

/// Calculate downside deviation (only negative returns).
pub fn downside_deviation(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let variance_sum: Decimal = values
        .iter()
        .filter(|v| **v < Decimal::ZERO)
        .map(|v| *v * *v)
        .sum();
    let variance = variance_sum / Decimal::from(values.len() as u64); // Use total count

    sqrt_decimal(variance)
}

/// Square root using Newton's method.
///
/// Stops when an iteration no longer changes the estimate, or after
/// [`SQRT_MAX_ITERATIONS`].
pub fn sqrt_decimal(value: Decimal) -> Option<Decimal> {
    if value < Decimal::ZERO {
        return None;
    }
    if value == Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut guess = if value > Decimal::ONE {
        value / TWO
    } else {
        Decimal::ONE
    };

    for _ in 0..SQRT_MAX_ITERATIONS {
        let next = (guess + value / guess) / TWO;
        if next == guess {
            break;
        }
        guess = next;
    }

    Some(guess)
}
