//! Cent rounding policies.
//!
//! Installments and levies always round *up* to the cent so that a payer is
//! never short by a fraction of a cent. Posted interest uses half-away-from-
//! zero, and affordability ceilings round down.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::Money;

/// Smallest balance treated as fully repaid.
pub const RESIDUAL_EPSILON: Money = dec!(0.01);

const CENTS: u32 = 2;

/// Round toward positive infinity at 2 dp.
pub fn ceil_cents(value: Decimal) -> Money {
    value.round_dp_with_strategy(CENTS, RoundingStrategy::ToPositiveInfinity)
}

/// Round half away from zero at 2 dp.
pub fn round_cents(value: Decimal) -> Money {
    value.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero)
}

/// Round toward negative infinity at 2 dp.
pub fn floor_cents(value: Decimal) -> Money {
    value.round_dp_with_strategy(CENTS, RoundingStrategy::ToNegativeInfinity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_never_rounds_down() {
        assert_eq!(ceil_cents(dec!(2019.567754)), dec!(2019.57));
        assert_eq!(ceil_cents(dec!(2019.561)), dec!(2019.57));
        assert_eq!(ceil_cents(dec!(2019.56)), dec!(2019.56));
        assert_eq!(ceil_cents(dec!(0.001)), dec!(0.01));
    }

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_cents(dec!(1537.495)), dec!(1537.50));
        assert_eq!(round_cents(dec!(1537.494)), dec!(1537.49));
    }

    #[test]
    fn test_floor() {
        assert_eq!(floor_cents(dec!(449999.999)), dec!(449999.99));
        assert_eq!(floor_cents(dec!(12.3)), dec!(12.30));
    }
}
