//! Transaction cost calculation for simulated fills.

use rust_decimal::Decimal;

use super::config::TransactionCost;

/// Cost of a single fill of `units` at `price`.
///
/// Notional is taken as an absolute value so shorts pay the same as longs.
#[must_use]
pub fn calculate_fill_cost(cost: &TransactionCost, units: Decimal, price: Decimal) -> Decimal {
    (units * price).abs() * cost.rate + cost.fixed_fee
}

/// Split `capital` into invested notional and entry cost.
///
/// Solves `invested × (1 + rate) + fixed_fee = capital`, so the whole of the
/// capital is committed. Returns `None` when the fee alone exhausts it.
#[must_use]
pub fn size_entry(cost: &TransactionCost, capital: Decimal) -> Option<(Decimal, Decimal)> {
    let available = capital - cost.fixed_fee;
    if available <= Decimal::ZERO {
        return None;
    }
    let invested = available / (Decimal::ONE + cost.rate);
    Some((invested, capital - invested))
}
