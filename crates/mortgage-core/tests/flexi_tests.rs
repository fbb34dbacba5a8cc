use chrono::NaiveDate;
use mortgage_core::amortization::schedule::build_schedule_with;
use mortgage_core::calendar::DayCount;
use mortgage_core::flexi::events::{FlexiEventDetails, FlexiEventKind};
use mortgage_core::flexi::simulator::{simulate_flexi_loan, AdvancePayment, FlexiInput};
use mortgage_core::flexi::state::{FlexiLoanType, PaymentMethod};
use mortgage_core::LoanTerms;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn full_flexi_with_50k_advance() -> FlexiInput {
    FlexiInput {
        terms: LoanTerms::new(dec!(450_000), dec!(4.1), 35, Some(ymd(2025, 1, 1))),
        loan_type: FlexiLoanType::FullFlexi,
        payment_method: PaymentMethod::AutoDebit,
        advances: vec![AdvancePayment::new(ymd(2025, 2, 1), dec!(50_000))],
    }
}

// ===========================================================================
// Offset behaviour
// ===========================================================================

#[test]
fn test_advance_drops_effective_balance_immediately() {
    let out = simulate_flexi_loan(&full_flexi_with_50k_advance());
    let events = &out.result.events;

    let advance_at = events.iter().position(|e| e.kind() == FlexiEventKind::Advance).unwrap();
    match &events[advance_at].details {
        FlexiEventDetails::Advance {
            bucket_portion,
            reserve_portion,
            ..
        } => {
            assert_eq!(*bucket_portion, dec!(50_000));
            assert_eq!(*reserve_portion, Decimal::ZERO);
        }
        other => panic!("Expected Advance, got {other:?}"),
    }

    match &events[advance_at + 1].details {
        FlexiEventDetails::DueDate {
            period_index,
            effective_balance,
            ..
        } => {
            assert_eq!(*period_index, 1);
            assert_eq!(*effective_balance, dec!(400_000));
        }
        other => panic!("Expected DueDate, got {other:?}"),
    }
}

#[test]
fn test_interest_below_baseline_after_advance() {
    let input = full_flexi_with_50k_advance();
    let out = simulate_flexi_loan(&input);
    let baseline = build_schedule_with(&input.terms, DayCount::Actual365);

    let points = &out.result.points;
    // the advance lands on the first due date, so period 1 accrued on the full balance
    assert_eq!(points[0].interest, baseline[0].interest_component);
    assert!(points[1].interest < baseline[1].interest_component);

    let summary = &out.result.summary;
    assert!(summary.interest_savings > Decimal::ZERO);
    assert_eq!(
        summary.interest_savings,
        summary.baseline_total_interest - summary.flexi_total_interest
    );
}

#[test]
fn test_full_flexi_bucket_covers_installments() {
    let out = simulate_flexi_loan(&full_flexi_with_50k_advance());
    let events = &out.result.events;

    let triggers: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind() == FlexiEventKind::SmartLogicTrigger)
        .map(|(i, _)| i)
        .collect();
    assert!(!triggers.is_empty());
    for i in triggers {
        assert_eq!(events[i - 1].kind(), FlexiEventKind::DueDate);
        assert_eq!(events[i - 1].date, events[i].date);
    }

    // 50k of installments at 2019.57 empties the bucket within 25 months
    assert_eq!(out.result.points[30].offset_bucket_balance, Decimal::ZERO);
}

#[test]
fn test_semi_flexi_pays_off_early() {
    let input = FlexiInput {
        terms: LoanTerms::new(dec!(300_000), dec!(4.0), 30, Some(ymd(2025, 1, 1))),
        loan_type: FlexiLoanType::SemiFlexi,
        payment_method: PaymentMethod::AutoDebit,
        advances: vec![AdvancePayment::new(ymd(2025, 3, 10), dec!(100_000))],
    };
    let out = simulate_flexi_loan(&input);
    let s = &out.result.summary;

    assert!(!s.truncated);
    assert_eq!(s.final_balance, Decimal::ZERO);
    assert_eq!(s.baseline_months, 360);
    assert!(s.flexi_months < 360);
    assert_eq!(s.earlier_by_months, Some(360 - s.flexi_months));
    assert_eq!(s.earlier_payoff_date, out.result.points.last().map(|p| p.date));

    // semi-flexi never draws down the bucket once funded
    assert!(out
        .result
        .points
        .iter()
        .filter(|p| p.date > ymd(2025, 3, 10))
        .all(|p| p.offset_bucket_balance == dec!(80_000)));
    assert!(out
        .result
        .events
        .iter()
        .all(|e| e.kind() != FlexiEventKind::SmartLogicTrigger));
}

#[test]
fn test_direct_payment_keeps_reserve() {
    let input = FlexiInput {
        terms: LoanTerms::new(dec!(300_000), dec!(4.0), 30, Some(ymd(2025, 1, 1))),
        loan_type: FlexiLoanType::SemiFlexi,
        payment_method: PaymentMethod::Direct,
        advances: vec![AdvancePayment::new(ymd(2025, 1, 1), dec!(10_000))],
    };
    let out = simulate_flexi_loan(&input);
    assert!(out
        .result
        .points
        .iter()
        .all(|p| p.savings_reserve_balance == dec!(2000)));
}

// ===========================================================================
// Event log
// ===========================================================================

#[test]
fn test_events_ordered_by_date_then_sequence() {
    let mut input = full_flexi_with_50k_advance();
    input.advances.push(AdvancePayment::new(ymd(2026, 7, 19), dec!(5000)));
    input.advances.push(AdvancePayment::new(ymd(2025, 9, 1), dec!(7500)));
    let out = simulate_flexi_loan(&input);
    let events = &out.result.events;

    for pair in events.windows(2) {
        assert!(pair[0].date <= pair[1].date);
        assert_eq!(pair[0].sequence + 1, pair[1].sequence);
    }
    let advances = events.iter().filter(|e| e.kind() == FlexiEventKind::Advance).count();
    assert_eq!(advances, 3);
}

#[test]
fn test_flexi_input_from_json() {
    let raw = r#"{
        "principal": "450000",
        "annual_rate_percent": 4.1,
        "tenure_years": 35,
        "start_date": "2025-01-01",
        "loan_type": "full-flexi",
        "advances": [{"date": "2025-02-01", "amount": "50,000"}]
    }"#;
    let input: FlexiInput = serde_json::from_str(raw).unwrap();
    assert_eq!(input.loan_type, FlexiLoanType::FullFlexi);
    assert_eq!(input.payment_method, PaymentMethod::AutoDebit);
    assert_eq!(input.advances[0].amount, dec!(50_000));

    let json = serde_json::to_value(simulate_flexi_loan(&input).result).unwrap();
    assert_eq!(json["events"][0]["kind"], "loan_start");
    assert_eq!(json["events"][1]["kind"], "advance");
}
