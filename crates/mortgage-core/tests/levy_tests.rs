use mortgage_core::levy::entry_costs::{self, EntryCostInput, NetPriceInput};
use mortgage_core::levy::tiered::{compute_tiered_amount, tiered_breakdown, LevyBand, LEGAL_FEE_BANDS, MOT_BANDS};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Tiered bands
// ===========================================================================

#[test]
fn test_mot_duty_600k() {
    // 1000 + 8000 + 3000
    assert_eq!(compute_tiered_amount(dec!(600_000), &MOT_BANDS), dec!(12_000));

    let slices = tiered_breakdown(dec!(600_000), &MOT_BANDS);
    let contributions: Vec<Decimal> = slices.iter().map(|s| s.contribution).collect();
    assert_eq!(contributions, vec![dec!(1000), dec!(8000), dec!(3000)]);
}

#[test]
fn test_band_edges() {
    assert_eq!(compute_tiered_amount(dec!(100_000), &MOT_BANDS), dec!(1000));
    assert_eq!(compute_tiered_amount(dec!(500_000), &MOT_BANDS), dec!(9000));
    assert_eq!(compute_tiered_amount(dec!(1_000_000), &MOT_BANDS), dec!(24_000));
    assert_eq!(compute_tiered_amount(dec!(1_500_000), &MOT_BANDS), dec!(44_000));
}

#[test]
fn test_negative_amount_is_zero() {
    assert_eq!(compute_tiered_amount(dec!(-10), &MOT_BANDS), Decimal::ZERO);
    assert!(tiered_breakdown(dec!(-10), &MOT_BANDS).is_empty());
}

#[test]
fn test_custom_bands() {
    let bands = [LevyBand::capped(dec!(10), dec!(0.1)), LevyBand::unbounded(dec!(0.5))];
    assert_eq!(compute_tiered_amount(dec!(30), &bands), dec!(11));
}

#[test]
fn test_legal_scale_large_price() {
    // 5000 + 4000 + 14000 + 12000 + 5000
    assert_eq!(compute_tiered_amount(dec!(6_000_000), &LEGAL_FEE_BANDS), dec!(40_000));
}

// ===========================================================================
// Entry costs and net price
// ===========================================================================

#[test]
fn test_entry_costs_600k() {
    let out = entry_costs::calculate_entry_costs(&EntryCostInput {
        property_price: dec!(600_000),
        loan_amount: dec!(540_000),
    });
    let r = &out.result;
    assert_eq!(r.legal_fee, dec!(5800));
    assert_eq!(r.mot_stamp_duty, dec!(12_000));
    assert_eq!(r.loan_stamp_duty, dec!(2700));
    assert_eq!(r.total, dec!(20_500));
    assert_eq!(r.mot_bands.len(), 3);
}

#[test]
fn test_levies_round_up() {
    // 0.5% of 100,001.01 = 500.00505
    assert_eq!(entry_costs::loan_stamp_duty(dec!(100_001.01)), dec!(500.01));
}

#[test]
fn test_entry_costs_from_strings() {
    let input: EntryCostInput =
        serde_json::from_str(r#"{"property_price": "600,000", "loan_amount": "oops"}"#).unwrap();
    let out = entry_costs::calculate_entry_costs(&input);
    assert_eq!(out.result.loan_stamp_duty, Decimal::ZERO);
    assert_eq!(out.result.total, dec!(17_800));
}

#[test]
fn test_net_price_cash_back() {
    let out = entry_costs::calculate_net_price(&NetPriceInput {
        price: dec!(500_000),
        margin_percent: dec!(90),
        rebate_percent: dec!(15),
    });
    let r = &out.result;
    assert_eq!(r.loan_amount, dec!(450_000));
    assert_eq!(r.net_price, dec!(425_000));
    assert_eq!(r.cash_back, dec!(25_000));
}
