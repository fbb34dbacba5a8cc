//! Reverse affordability: from a monthly payment the borrower can carry,
//! the largest loan and property price it supports.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amortization::installment::compute_installment;
use crate::normalize::{self, lenient_money, lenient_years};
use crate::rounding::{ceil_cents, floor_cents};
use crate::types::*;

/// Reference DSR line for implied-income reporting. Independent of the
/// affordability bands.
pub const IMPLIED_DSR: Ratio = dec!(0.60);

fn default_margin() -> Ratio {
    dec!(0.90)
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseInput {
    #[serde(default, deserialize_with = "lenient_money")]
    pub monthly_payment: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub annual_rate_percent: Percent,
    #[serde(default, deserialize_with = "lenient_years")]
    pub tenure_years: u32,
    /// Loan-to-value ratio, e.g. 0.90.
    #[serde(default = "default_margin", deserialize_with = "lenient_money")]
    pub margin_ratio: Ratio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseOutput {
    pub max_loan_amount: Money,
    pub max_property_price: Money,
    pub implied_dsr: Ratio,
    /// Net income at which `monthly_payment` sits exactly on the implied DSR.
    pub required_net_income: Money,
    /// Installment of a loan of `max_loan_amount`; never above the payment.
    pub installment_at_max: Money,
}

// ---------------------------------------------------------------------------
// Core calculations
// ---------------------------------------------------------------------------

/// Inverse annuity: `payment × (1 − (1+r)^−n) / r`, or `payment × n` at a
/// zero rate. Rounded down so the resulting loan is always serviceable.
pub fn max_principal_from_payment(monthly_payment: Money, annual_rate_percent: Percent, tenure_years: u32) -> Money {
    if monthly_payment <= Decimal::ZERO
        || annual_rate_percent < Decimal::ZERO
        || tenure_years == 0
        || tenure_years > MAX_TENURE_YEARS
    {
        return Decimal::ZERO;
    }

    let n = tenure_years * MONTHS_PER_YEAR;
    let r = annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR);

    if r.is_zero() {
        return floor_cents(monthly_payment * Decimal::from(n));
    }

    let discount = match (Decimal::ONE + r).checked_powu(u64::from(n)) {
        Some(growth) if growth > Decimal::ONE => Decimal::ONE - Decimal::ONE / growth,
        _ => Decimal::ONE,
    };

    floor_cents(monthly_payment * discount / r)
}

pub fn max_property_price(max_principal: Money, margin_ratio: Ratio) -> Money {
    if max_principal <= Decimal::ZERO || margin_ratio <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    floor_cents(max_principal / margin_ratio)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_reverse_affordability(input: &ReverseInput) -> ComputationOutput<ReverseOutput> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let payment = normalize::non_negative("monthly_payment", input.monthly_payment, &mut warnings);
    let rate = normalize::non_negative("annual_rate_percent", input.annual_rate_percent, &mut warnings);
    let tenure = normalize::tenure("tenure_years", input.tenure_years, &mut warnings);
    let margin = normalize::non_negative("margin_ratio", input.margin_ratio, &mut warnings);
    if margin > Decimal::ONE {
        warnings.push(format!("margin_ratio {margin} is above 1.0; property price will be below the loan"));
    }

    let max_loan_amount = max_principal_from_payment(payment, rate, tenure);
    let output = ReverseOutput {
        max_loan_amount,
        max_property_price: max_property_price(max_loan_amount, margin),
        implied_dsr: IMPLIED_DSR,
        required_net_income: ceil_cents(payment / IMPLIED_DSR),
        installment_at_max: compute_installment(max_loan_amount, rate, tenure),
    };

    debug!(%payment, max_loan = %output.max_loan_amount, "reverse affordability");

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Inverse annuity (max principal from payment)",
        &serde_json::json!({
            "annual_rate_percent": rate.to_string(),
            "tenure_years": tenure,
            "margin_ratio": margin.to_string(),
            "implied_dsr": IMPLIED_DSR.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
