//! Fixed-scale money arithmetic helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to a currency's minor units (banker's rounding).
#[inline]
pub fn round_to_scale(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven)
}

/// Converts a local amount into the base currency and rounds it to the base
/// currency's minor units.
#[inline]
pub fn convert_to_base(amount: Decimal, rate: Decimal, base_scale: u32) -> Decimal {
    round_to_scale(amount * rate, base_scale)
}

/// Adds a signed amount to an income/expense pair.
///
/// Positive amounts grow `income`, negative amounts grow `expense` by their
/// magnitude. Expenses are always kept as positive magnitudes.
#[inline]
pub fn route_signed(amount: Decimal, income: &mut Decimal, expense: &mut Decimal) {
    if amount > Decimal::ZERO {
        *income += amount;
    } else if amount < Decimal::ZERO {
        *expense += -amount;
    }
}
