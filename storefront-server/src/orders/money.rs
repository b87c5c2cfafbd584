//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are `Decimal` with two places in the domain and integer cents in
//! SQLite. Conversion happens only at the repository boundary.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 9999;

/// Round to two places, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Integer cents → `Decimal` (scale 2)
#[inline]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// `Decimal` → integer cents, `None` when out of `i64` range
pub fn to_cents(value: Decimal) -> Option<i64> {
    (round_money(value) * Decimal::ONE_HUNDRED).to_i64()
}

/// unit_price × quantity
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Sum of line totals
pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round_money(amounts.into_iter().sum())
}
