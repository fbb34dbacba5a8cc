use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::rounding::{ceil_cents, round_cents, RESIDUAL_EPSILON};
use crate::types::{Money, Percent, MAX_TENURE_YEARS, MONTHS_PER_YEAR};

/// Fixed monthly installment for a fully amortizing loan.
///
/// `P·r / (1 − (1+r)^−n)` with `r = annual% / 100 / 12` and `n = years × 12`,
/// straight-line `P / n` at a zero rate. The result is rounded *up* to the
/// cent. Degenerate input (non-positive principal, negative rate, tenure
/// outside 1..=35) yields zero.
pub fn compute_installment(principal: Money, annual_rate_percent: Percent, tenure_years: u32) -> Money {
    if principal <= Decimal::ZERO
        || annual_rate_percent < Decimal::ZERO
        || tenure_years == 0
        || tenure_years > MAX_TENURE_YEARS
    {
        return Decimal::ZERO;
    }

    let n = tenure_years * MONTHS_PER_YEAR;
    let r = annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR);

    if r.is_zero() {
        return ceil_cents(principal / Decimal::from(n));
    }

    // (1+r)^n can overflow for absurd rates; the payment then tends to the
    // interest-only amount.
    let payment = match (Decimal::ONE + r).checked_powu(u64::from(n)) {
        Some(growth) if growth > Decimal::ONE => {
            principal * r / (Decimal::ONE - Decimal::ONE / growth)
        }
        _ => principal * r,
    };

    ceil_cents(payment)
}

/// One settled period: what was paid and how it split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub closing_balance: Money,
}

/// Settle a period against `opening` balance.
///
/// Interest is posted to the cent; principal is what is left of the
/// installment, never more than the balance. In the last contractual period,
/// or when the leftover would be within [`RESIDUAL_EPSILON`], the whole
/// balance is retired so the loan closes at exactly zero. The payment
/// therefore shrinks in a short terminal period and absorbs any residual in
/// the last one.
pub fn settle_period(opening: Money, accrued_interest: Money, installment: Money, is_final: bool) -> Settlement {
    let interest = round_cents(accrued_interest.max(Decimal::ZERO));
    let mut principal = (installment - interest).max(Decimal::ZERO).min(opening);
    if is_final || opening - principal <= RESIDUAL_EPSILON {
        principal = opening;
    }
    Settlement {
        payment: principal + interest,
        principal,
        interest,
        closing_balance: opening - principal,
    }
}
