use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::levy::tiered::{
    compute_tiered_amount, tiered_breakdown, BandSlice, LEGAL_FEE_BANDS, LOAN_INSTRUMENT_BANDS,
    MOT_BANDS,
};
use crate::normalize::{self, lenient_money};
use crate::rounding::ceil_cents;
use crate::types::*;

/// Floor applied to any positive legal fee.
pub const MIN_LEGAL_FEE: Money = dec!(500);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryCostInput {
    #[serde(default, deserialize_with = "lenient_money")]
    pub property_price: Money,
    #[serde(default, deserialize_with = "lenient_money")]
    pub loan_amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryCostOutput {
    pub legal_fee: Money,
    pub mot_stamp_duty: Money,
    pub loan_stamp_duty: Money,
    pub total: Money,
    pub legal_fee_bands: Vec<BandSlice>,
    pub mot_bands: Vec<BandSlice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetPriceInput {
    #[serde(default, deserialize_with = "lenient_money")]
    pub price: Money,
    /// Financing margin as a percentage (90 = 90%).
    #[serde(default, deserialize_with = "lenient_money")]
    pub margin_percent: Percent,
    /// Developer rebate as a percentage of price.
    #[serde(default, deserialize_with = "lenient_money")]
    pub rebate_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPriceOutput {
    pub loan_amount: Money,
    pub net_price: Money,
    pub cash_back: Money,
}

// ---------------------------------------------------------------------------
// Single levies
// ---------------------------------------------------------------------------

pub fn mot_stamp_duty(property_price: Money) -> Money {
    ceil_cents(compute_tiered_amount(property_price, &MOT_BANDS))
}

/// Legal fee on the tiered scale, never below [`MIN_LEGAL_FEE`] for a
/// positive price.
pub fn legal_fee(property_price: Money) -> Money {
    if property_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ceil_cents(compute_tiered_amount(property_price, &LEGAL_FEE_BANDS)).max(MIN_LEGAL_FEE)
}

pub fn loan_stamp_duty(loan_amount: Money) -> Money {
    ceil_cents(compute_tiered_amount(loan_amount, &LOAN_INSTRUMENT_BANDS))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Up-front costs of a purchase: legal fee, transfer duty and loan duty.
pub fn calculate_entry_costs(input: &EntryCostInput) -> ComputationOutput<EntryCostOutput> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let price = normalize::non_negative("property_price", input.property_price, &mut warnings);
    let loan = normalize::non_negative("loan_amount", input.loan_amount, &mut warnings);
    debug!(%price, %loan, "calculating entry costs");

    let legal = legal_fee(price);
    let mot = mot_stamp_duty(price);
    let loan_duty = loan_stamp_duty(loan);

    let output = EntryCostOutput {
        legal_fee: legal,
        mot_stamp_duty: mot,
        loan_stamp_duty: loan_duty,
        total: ceil_cents(legal + mot + loan_duty),
        legal_fee_bands: tiered_breakdown(price, &LEGAL_FEE_BANDS),
        mot_bands: tiered_breakdown(price, &MOT_BANDS),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Tiered entry costs (legal scale, MOT duty, loan instrument duty)",
        &serde_json::json!({
            "property_price": price.to_string(),
            "loan_amount": loan.to_string(),
            "min_legal_fee": MIN_LEGAL_FEE.to_string(),
            "rounding": "ceiling to 2dp",
        }),
        warnings,
        elapsed,
        output,
    )
}

/// Loan amount, rebated price and the cash released to the buyer when the
/// loan exceeds the net price.
pub fn calculate_net_price(input: &NetPriceInput) -> ComputationOutput<NetPriceOutput> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let price = normalize::non_negative("price", input.price, &mut warnings);
    let margin = normalize::non_negative("margin_percent", input.margin_percent, &mut warnings);
    let rebate = normalize::non_negative("rebate_percent", input.rebate_percent, &mut warnings);

    let output = if price.is_zero() || margin.is_zero() {
        NetPriceOutput {
            loan_amount: Decimal::ZERO,
            net_price: Decimal::ZERO,
            cash_back: Decimal::ZERO,
        }
    } else {
        let loan_amount = price * margin / dec!(100);
        let net_price = price * (Decimal::ONE - rebate / dec!(100));
        NetPriceOutput {
            loan_amount: ceil_cents(loan_amount),
            net_price: ceil_cents(net_price),
            cash_back: ceil_cents((loan_amount - net_price).max(Decimal::ZERO)),
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Net price and cash back",
        &serde_json::json!({
            "price": price.to_string(),
            "margin_percent": margin.to_string(),
            "rebate_percent": rebate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
