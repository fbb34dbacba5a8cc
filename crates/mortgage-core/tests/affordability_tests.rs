use mortgage_core::affordability::commitments::{summarize_commitments, CommitmentLine};
use mortgage_core::affordability::dsr::{self, AffordabilityBand, AffordabilityInput};
use mortgage_core::affordability::income::{recognize_income, IncomeInput};
use mortgage_core::affordability::mitigation::{simulate_mitigation, MitigationInput};
use mortgage_core::handbook::{BankTier, IncomeType};
use mortgage_core::Handbook;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// DSR / NDI
// ===========================================================================

#[test]
fn test_sixty_percent_is_yellow() {
    let r = dsr::compute_affordability(&AffordabilityInput {
        total_commitment: dec!(3000),
        net_income: dec!(5000),
        living_cost_baseline: dec!(1500),
    });
    assert_eq!(r.dsr_ratio, dec!(0.6));
    assert_eq!(r.net_disposable_income, dec!(2000));
    assert_eq!(r.band, AffordabilityBand::Yellow);
}

#[test]
fn test_band_serializes_screaming_case() {
    let json = serde_json::to_value(AffordabilityBand::FailCost).unwrap();
    assert_eq!(json, "FAIL_COST");
}

#[test]
fn test_commitment_stack_feeds_assessment() {
    let lines = vec![
        CommitmentLine::new("housing", dec!(2200), dec!(420_000)).housing(),
        CommitmentLine::new("car", dec!(850), dec!(45_000)),
        CommitmentLine::new("pawn", dec!(200), Decimal::ZERO).hidden(),
    ];
    let summary = summarize_commitments(&lines);
    assert_eq!(summary.bank_commitment, dec!(3050));

    let out = dsr::assess_affordability(
        &AffordabilityInput {
            total_commitment: summary.total_commitment,
            net_income: dec!(5000),
            living_cost_baseline: dec!(1200),
        },
        &Handbook::default(),
    );
    let a = &out.result;
    assert_eq!(a.result.dsr_ratio, dec!(0.65));
    assert_eq!(a.result.band, AffordabilityBand::Yellow);
    assert_eq!(a.gap.debt_clearance_needed, dec!(250));
    assert!(a.bank_tiers.iter().all(|t| t.tier == BankTier::Tier2));
}

#[test]
fn test_assessment_from_partial_json() {
    let input: AffordabilityInput = serde_json::from_str(r#"{"total_commitment": "1,000"}"#).unwrap();
    let out = dsr::assess_affordability(&input, &Handbook::default());
    assert_eq!(out.result.result.dsr_ratio, Decimal::ZERO);
    assert_eq!(out.result.result.band, AffordabilityBand::FailCost);
    assert!(!out.warnings.is_empty());
}

// ===========================================================================
// Income and handbook
// ===========================================================================

#[test]
fn test_income_uses_handbook_override() {
    let handbook = Handbook::from_json_str(r#"{"income_matrix": {"rental": {"haircut": 0.5}}}"#).unwrap();
    let input: IncomeInput = serde_json::from_str(
        r#"{"lines": [
            {"income_type": "basic_salary", "amount": 4000},
            {"income_type": "rental", "amount": "2,000"}
        ]}"#,
    )
    .unwrap();
    let out = recognize_income(&input, &handbook);
    let rental = out
        .result
        .rows
        .iter()
        .find(|r| r.income_type == IncomeType::Rental)
        .unwrap();
    assert_eq!(rental.recognized_amount, dec!(1000));
    // EPF 440 + SOCSO 20 + PCB 3% of 1500
    assert_eq!(out.result.statutory.total, dec!(505));
    assert_eq!(out.result.total_recognized_income, dec!(4495));
}

// ===========================================================================
// Mitigation
// ===========================================================================

#[test]
fn test_mitigation_uses_handbook_target() {
    let handbook = Handbook::from_json_str(r#"{"bank_strategies": {"default_dsr_limit": 0.5}}"#).unwrap();
    let input = MitigationInput {
        net_income: dec!(5000),
        living_cost_baseline: dec!(1000),
        commitments: vec![
            CommitmentLine::new("housing", dec!(2000), dec!(350_000)).housing(),
            CommitmentLine::new("card", dec!(1000), dec!(20_000)),
        ],
        current_tenure_years: 35,
        housing_rate_percent: Some(dec!(4)),
    };
    let out = simulate_mitigation(&input, &handbook);
    let r = &out.result;
    assert_eq!(r.target_dsr, dec!(0.5));
    // 3000 / 0.5 − 5000
    assert_eq!(r.income_deficit, dec!(1000));
    assert!(r.soft_fix.is_none());
    let settle = r.debt_settlement.as_ref().unwrap();
    assert_eq!(settle.result.band, AffordabilityBand::Green);
}
