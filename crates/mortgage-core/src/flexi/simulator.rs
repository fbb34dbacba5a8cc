use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::amortization::installment::compute_installment;
use crate::amortization::schedule::{build_schedule_with, interest_over};
use crate::calendar::{days_between, due_date, DayCount};
use crate::flexi::events::{EventLog, FlexiEvent, FlexiEventDetails};
use crate::flexi::state::{transition, FlexiLoanType, FlexiPolicy, FlexiState, PaymentMethod, Transition};
use crate::normalize::{lenient_date, lenient_money};
use crate::types::*;

/// Upper bound on simulated due dates, whatever the tenure.
pub const HORIZON_CAP_MONTHS: u32 = 360;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Lump sum parked in the flexi account on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancePayment {
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_money")]
    pub amount: Money,
}

impl AdvancePayment {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self {
            date: Some(date),
            amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlexiInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(default)]
    pub loan_type: FlexiLoanType,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub advances: Vec<AdvancePayment>,
}

/// Balances after one due date, for charting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexiPoint {
    pub period_index: u32,
    pub date: NaiveDate,
    pub housing_loan_balance: Money,
    pub savings_reserve_balance: Money,
    pub offset_bucket_balance: Money,
    pub effective_balance: Money,
    pub interest: Money,
    pub cumulative_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexiSummary {
    pub baseline_total_interest: Money,
    pub flexi_total_interest: Money,
    pub interest_savings: Money,
    pub baseline_months: u32,
    pub flexi_months: u32,
    pub earlier_payoff_date: Option<NaiveDate>,
    pub earlier_by_months: Option<u32>,
    pub final_balance: Money,
    /// The horizon cap stopped the run before the loan was repaid.
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlexiOutput {
    pub loan_type: FlexiLoanType,
    pub payment_method: PaymentMethod,
    pub installment: Money,
    pub horizon_months: u32,
    pub points: Vec<FlexiPoint>,
    pub events: Vec<FlexiEvent>,
    pub summary: FlexiSummary,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

struct FlexiRun {
    points: Vec<FlexiPoint>,
    log: EventLog,
    state: FlexiState,
    unfired_advances: usize,
}

fn run(terms: &LoanTerms, start: NaiveDate, policy: &FlexiPolicy, advances: &[(NaiveDate, Money)], horizon: u32) -> FlexiRun {
    let periods = terms.periods();
    let mut log = EventLog::new();
    log.append(
        start,
        FlexiEventDetails::LoanStart {
            principal: terms.principal,
            annual_rate_percent: terms.annual_rate_percent,
            tenure_years: terms.tenure_years,
            installment: policy.installment,
        },
    );

    let mut state = FlexiState::opening(terms.principal);
    let mut points = Vec::with_capacity(horizon as usize);
    let mut last_date = start;
    let mut pending = advances.iter().peekable();

    for period in 1..=horizon {
        let due = due_date(start, period);

        while let Some(&&(advance_date, amount)) = pending.peek() {
            if advance_date > due {
                break;
            }
            let date = advance_date.max(last_date);
            let (next, emitted) = transition(
                state,
                policy,
                Transition::Advance {
                    date,
                    amount,
                    days_elapsed: days_between(last_date, date),
                },
            );
            state = next;
            log.extend_at(date, emitted);
            last_date = date;
            pending.next();
        }

        let (next, emitted) = transition(
            state,
            policy,
            Transition::DueDate {
                date: due,
                period_index: period,
                days_elapsed: days_between(last_date, due),
                is_final: period == periods,
            },
        );
        let effective_balance = emitted
            .iter()
            .find_map(|e| match e {
                FlexiEventDetails::DueDate { effective_balance, .. } => Some(*effective_balance),
                _ => None,
            })
            .unwrap_or(Decimal::ZERO);

        points.push(FlexiPoint {
            period_index: period,
            date: due,
            housing_loan_balance: next.housing_loan_balance,
            savings_reserve_balance: next.savings_reserve_balance,
            offset_bucket_balance: next.offset_bucket_balance,
            effective_balance,
            interest: next.cumulative_interest - state.cumulative_interest,
            cumulative_interest: next.cumulative_interest,
        });
        log.extend_at(due, emitted);
        state = next;
        last_date = due;

        if state.is_paid_off() {
            break;
        }
    }

    FlexiRun {
        points,
        log,
        state,
        unfired_advances: pending.count(),
    }
}

/// Usable advances sorted by date. Undated or non-positive entries are
/// dropped with a warning.
fn prepare_advances(advances: &[AdvancePayment], warnings: &mut Vec<String>) -> Vec<(NaiveDate, Money)> {
    let mut prepared: Vec<(NaiveDate, Money)> = advances
        .iter()
        .enumerate()
        .filter_map(|(i, a)| match a.date {
            Some(date) if a.amount > Decimal::ZERO => Some((date, a.amount)),
            Some(_) => {
                warnings.push(format!("advance #{} has a non-positive amount; ignored", i + 1));
                None
            }
            None => {
                warnings.push(format!("advance #{} has no valid date; ignored", i + 1));
                None
            }
        })
        .collect();
    prepared.sort_by_key(|(date, _)| *date);
    prepared
}

fn empty_output(loan_type: FlexiLoanType, payment_method: PaymentMethod) -> FlexiOutput {
    FlexiOutput {
        loan_type,
        payment_method,
        installment: Decimal::ZERO,
        horizon_months: 0,
        points: Vec::new(),
        events: Vec::new(),
        summary: FlexiSummary {
            baseline_total_interest: Decimal::ZERO,
            flexi_total_interest: Decimal::ZERO,
            interest_savings: Decimal::ZERO,
            baseline_months: 0,
            flexi_months: 0,
            earlier_payoff_date: None,
            earlier_by_months: None,
            final_balance: Decimal::ZERO,
            truncated: false,
        },
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate an offset loan with daily-rest interest and compare it against
/// the same loan without any parked funds.
///
/// Runs at most `min(tenure × 12, 360)` due dates. The baseline is the
/// ordinary schedule under the same actual/365 day count, so a run with no
/// advances reproduces it exactly.
pub fn simulate_flexi_loan(input: &FlexiInput) -> ComputationOutput<FlexiOutput> {
    let started = Instant::now();
    let (terms, mut warnings) = input.terms.normalized();

    let assumptions = serde_json::json!({
        "day_count": DayCount::Actual365,
        "loan_type": input.loan_type,
        "payment_method": input.payment_method,
        "horizon_cap_months": HORIZON_CAP_MONTHS,
        "semi_flexi_bucket_share": crate::flexi::state::SEMI_FLEXI_BUCKET_SHARE.to_string(),
    });
    let methodology = "Daily-rest offset loan simulation (actual/365)";

    let start = match terms.start_date {
        Some(date) if !terms.is_degenerate() => date,
        _ => {
            if terms.start_date.is_none() {
                warnings.push("start_date missing or invalid; nothing simulated".into());
            } else {
                warnings.push("loan terms are degenerate; nothing simulated".into());
            }
            let elapsed = started.elapsed().as_micros() as u64;
            return with_metadata(
                methodology,
                &assumptions,
                warnings,
                elapsed,
                empty_output(input.loan_type, input.payment_method),
            );
        }
    };

    let policy = FlexiPolicy {
        annual_rate: terms.annual_rate(),
        installment: compute_installment(terms.principal, terms.annual_rate_percent, terms.tenure_years),
        loan_type: input.loan_type,
        payment_method: input.payment_method,
    };
    let horizon = terms.periods().min(HORIZON_CAP_MONTHS);
    let advances = prepare_advances(&input.advances, &mut warnings);

    let flexi = run(&terms, start, &policy, &advances, horizon);
    if flexi.unfired_advances > 0 {
        warnings.push(format!(
            "{} advance(s) dated after the last simulated due date were not applied",
            flexi.unfired_advances
        ));
    }

    let baseline = build_schedule_with(&terms, DayCount::Actual365);
    let baseline_total_interest = interest_over(&baseline, horizon as usize);
    let flexi_total_interest = flexi.state.cumulative_interest;
    let baseline_months = baseline.len() as u32;
    let flexi_months = flexi.points.len() as u32;
    let truncated = !flexi.state.is_paid_off();

    if truncated {
        warn!(horizon, balance = %flexi.state.housing_loan_balance, "flexi simulation truncated at horizon");
        warnings.push(format!(
            "simulation stopped after {horizon} months with {} outstanding; results cover the horizon only",
            flexi.state.housing_loan_balance
        ));
    }

    let (earlier_payoff_date, earlier_by_months) = if !truncated && flexi_months < baseline_months {
        (flexi.points.last().map(|p| p.date), Some(baseline_months - flexi_months))
    } else {
        (None, None)
    };

    let summary = FlexiSummary {
        baseline_total_interest,
        flexi_total_interest,
        interest_savings: (baseline_total_interest - flexi_total_interest).max(Decimal::ZERO),
        baseline_months,
        flexi_months,
        earlier_payoff_date,
        earlier_by_months,
        final_balance: flexi.state.housing_loan_balance,
        truncated,
    };

    debug!(
        events = flexi.log.len(),
        months = flexi_months,
        savings = %summary.interest_savings,
        "flexi simulation complete"
    );

    let output = FlexiOutput {
        loan_type: input.loan_type,
        payment_method: input.payment_method,
        installment: policy.installment,
        horizon_months: horizon,
        points: flexi.points,
        events: flexi.log.into_vec(),
        summary,
    };

    let elapsed = started.elapsed().as_micros() as u64;
    with_metadata(methodology, &assumptions, warnings, elapsed, output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flexi::events::FlexiEventKind;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(tenure: u32, loan_type: FlexiLoanType, advances: Vec<AdvancePayment>) -> FlexiInput {
        FlexiInput {
            terms: LoanTerms::new(dec!(300_000), dec!(4.0), tenure, Some(ymd(2025, 1, 1))),
            loan_type,
            payment_method: PaymentMethod::AutoDebit,
            advances,
        }
    }

    #[test]
    fn test_no_advances_matches_baseline() {
        let out = simulate_flexi_loan(&input(30, FlexiLoanType::SemiFlexi, vec![]));
        let s = &out.result.summary;
        assert_eq!(s.flexi_total_interest, s.baseline_total_interest);
        assert_eq!(s.interest_savings, Decimal::ZERO);
        assert_eq!(s.flexi_months, 360);
        assert_eq!(s.final_balance, Decimal::ZERO);
        assert!(!s.truncated);
        assert!(s.earlier_payoff_date.is_none());
    }

    #[test]
    fn test_first_event_is_loan_start() {
        let out = simulate_flexi_loan(&input(10, FlexiLoanType::SemiFlexi, vec![]));
        let events = &out.result.events;
        assert_eq!(events[0].kind(), FlexiEventKind::LoanStart);
        assert_eq!(events[0].date, ymd(2025, 1, 1));
        assert_eq!(events.len(), 121);
    }

    #[test]
    fn test_advance_on_due_date_precedes_due_event() {
        let adv = AdvancePayment::new(ymd(2025, 2, 1), dec!(50_000));
        let out = simulate_flexi_loan(&input(30, FlexiLoanType::FullFlexi, vec![adv]));
        let events = &out.result.events;
        assert_eq!(events[1].kind(), FlexiEventKind::Advance);
        assert_eq!(events[2].kind(), FlexiEventKind::DueDate);
        assert_eq!(events[1].date, events[2].date);
    }

    #[test]
    fn test_advance_before_start_fires_at_start() {
        let adv = AdvancePayment::new(ymd(2024, 6, 1), dec!(10_000));
        let out = simulate_flexi_loan(&input(20, FlexiLoanType::SemiFlexi, vec![adv]));
        let advance = &out.result.events[1];
        assert_eq!(advance.kind(), FlexiEventKind::Advance);
        assert_eq!(advance.date, ymd(2025, 1, 1));
        assert_eq!(out.result.points[0].offset_bucket_balance, dec!(8000));
    }

    #[test]
    fn test_horizon_cap_truncates_35_year_loan() {
        let out = simulate_flexi_loan(&input(35, FlexiLoanType::SemiFlexi, vec![]));
        let r = &out.result;
        assert_eq!(r.horizon_months, 360);
        assert_eq!(r.points.len(), 360);
        assert!(r.summary.truncated);
        assert!(r.summary.final_balance > Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("360 months")));
    }

    #[test]
    fn test_missing_start_date_is_empty() {
        let mut i = input(30, FlexiLoanType::FullFlexi, vec![]);
        i.terms.start_date = None;
        let out = simulate_flexi_loan(&i);
        assert!(out.result.points.is_empty());
        assert!(out.result.events.is_empty());
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_invalid_advances_ignored() {
        let advances = vec![
            AdvancePayment {
                date: None,
                amount: dec!(1000),
            },
            AdvancePayment::new(ymd(2025, 3, 1), dec!(-5)),
        ];
        let out = simulate_flexi_loan(&input(30, FlexiLoanType::FullFlexi, advances));
        assert_eq!(out.result.summary.interest_savings, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 2);
    }
}
