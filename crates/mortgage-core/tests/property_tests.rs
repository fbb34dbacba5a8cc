use chrono::NaiveDate;
use mortgage_core::affordability::dsr::{compute_affordability, AffordabilityBand, AffordabilityInput};
use mortgage_core::amortization::installment::compute_installment;
use mortgage_core::amortization::schedule::build_schedule;
use mortgage_core::flexi::simulator::{simulate_flexi_loan, AdvancePayment, FlexiInput};
use mortgage_core::flexi::state::{FlexiLoanType, PaymentMethod};
use mortgage_core::levy::tiered::{compute_tiered_amount, tiered_breakdown, LEGAL_FEE_BANDS, MOT_BANDS};
use mortgage_core::reverse::max_principal_from_payment;
use mortgage_core::LoanTerms;
use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
use rust_decimal::Decimal;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

fn rate_from_bp(bp: u32) -> Decimal {
    Decimal::new(i64::from(bp), 2)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(48))]

    #[test]
    fn prop_schedule_repays_principal_exactly(
        principal in 1_000u32..2_000_000,
        rate_bp in 0u32..1500,
        tenure in 1u32..36
    ) {
        let principal = Decimal::from(principal);
        let terms = LoanTerms::new(principal, rate_from_bp(rate_bp), tenure, Some(start()));
        let rows = build_schedule(&terms);

        prop_assert!(!rows.is_empty());
        prop_assert!(rows.len() <= (tenure * 12) as usize);
        let repaid: Decimal = rows.iter().map(|r| r.principal_component).sum();
        prop_assert_eq!(repaid, principal);
        prop_assert_eq!(rows.last().unwrap().closing_balance, Decimal::ZERO);
        for row in &rows {
            prop_assert!(row.principal_component >= Decimal::ZERO);
            prop_assert_eq!(row.principal_component + row.interest_component, row.payment);
        }
    }

    #[test]
    fn prop_installment_monotonic(
        principal in 1_000u32..2_000_000,
        extra in 1u32..100_000,
        rate_bp in 0u32..1500,
        rate_step in 1u32..300,
        tenure in 1u32..36
    ) {
        let p = Decimal::from(principal);
        let r = rate_from_bp(rate_bp);
        let base = compute_installment(p, r, tenure);
        prop_assert!(base <= compute_installment(p + Decimal::from(extra), r, tenure));
        prop_assert!(base <= compute_installment(p, r + rate_from_bp(rate_step), tenure));
    }

    #[test]
    fn prop_levy_monotonic_and_breakdown_sums(
        amount in 0u64..20_000_000,
        step in 0u64..1_000_000
    ) {
        let a = Decimal::from(amount);
        let b = a + Decimal::from(step);
        for bands in [&MOT_BANDS[..], &LEGAL_FEE_BANDS[..]] {
            let total = compute_tiered_amount(a, bands);
            prop_assert!(total <= compute_tiered_amount(b, bands));
            let parts: Decimal = tiered_breakdown(a, bands).iter().map(|s| s.contribution).sum();
            prop_assert_eq!(parts, total);
        }
    }

    #[test]
    fn prop_fail_cost_overrides_ratio(
        income in 1u32..50_000,
        commitment_pct in 0u32..100,
        living in 0u32..20_000
    ) {
        let income = Decimal::from(income);
        let commitment = income * Decimal::new(i64::from(commitment_pct), 2);
        let living = Decimal::from(living);
        let r = compute_affordability(&AffordabilityInput {
            total_commitment: commitment,
            net_income: income,
            living_cost_baseline: living,
        });
        if income - commitment < living {
            prop_assert_eq!(r.band, AffordabilityBand::FailCost);
        } else {
            prop_assert!(r.band != AffordabilityBand::FailCost);
        }
    }

    #[test]
    fn prop_reverse_round_trip(
        principal in 10_000u32..2_000_000,
        rate_bp in 0u32..1500,
        tenure in 1u32..36
    ) {
        let p = Decimal::from(principal);
        let r = rate_from_bp(rate_bp);
        let recovered = max_principal_from_payment(compute_installment(p, r, tenure), r, tenure);
        let tolerance = Decimal::new(1, 2) * Decimal::from(tenure * 12);
        prop_assert!((recovered - p).abs() <= tolerance, "{} vs {}", recovered, p);
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(16))]

    #[test]
    fn prop_flexi_balances_stay_non_negative(
        principal in 50_000u32..1_000_000,
        rate_bp in 100u32..800,
        tenure in 5u32..36,
        advance in 0u32..300_000,
        advance_day in 0i64..3000,
        full in proptest::bool::ANY
    ) {
        let date = start() + chrono::Duration::days(advance_day);
        let input = FlexiInput {
            terms: LoanTerms::new(Decimal::from(principal), rate_from_bp(rate_bp), tenure, Some(start())),
            loan_type: if full { FlexiLoanType::FullFlexi } else { FlexiLoanType::SemiFlexi },
            payment_method: PaymentMethod::AutoDebit,
            advances: vec![AdvancePayment::new(date, Decimal::from(advance))],
        };
        let out = simulate_flexi_loan(&input).result;

        for p in &out.points {
            prop_assert!(p.housing_loan_balance >= Decimal::ZERO);
            prop_assert!(p.savings_reserve_balance >= Decimal::ZERO);
            prop_assert!(p.offset_bucket_balance >= Decimal::ZERO);
        }
        for pair in out.events.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }
        prop_assert!(out.summary.flexi_total_interest <= out.summary.baseline_total_interest);
    }
}
