use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::installment::{compute_installment, settle_period};
use crate::calendar::{days_between, due_date, DayCount};
use crate::types::*;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(default)]
    pub day_count: DayCount,
}

/// One monthly period of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period_index: u32,
    pub date: NaiveDate,
    pub opening_balance: Money,
    pub payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub closing_balance: Money,
}

/// Calendar-year roll-up of schedule rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: i32,
    pub periods: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub installment: Money,
    pub total_payment: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub period_count: u32,
    pub payoff_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub day_count: DayCount,
    pub monthly: Vec<AmortizationRow>,
    pub annual: Vec<AnnualSummary>,
    pub totals: ScheduleTotals,
}

// ---------------------------------------------------------------------------
// Schedule building
// ---------------------------------------------------------------------------

/// Monthly schedule under the annuity convention (interest = balance × r/12).
pub fn build_schedule(terms: &LoanTerms) -> Vec<AmortizationRow> {
    build_schedule_with(terms, DayCount::Monthly)
}

/// Monthly schedule under an explicit day-count convention.
///
/// Period `i` falls due `i` months after the start date. Every row pays the
/// fixed installment except a short terminal row, or the last contractual
/// row when a residual remains. Degenerate terms or a missing start date
/// give an empty schedule.
pub fn build_schedule_with(terms: &LoanTerms, day_count: DayCount) -> Vec<AmortizationRow> {
    let Some(start) = terms.start_date else {
        return Vec::new();
    };
    if terms.is_degenerate() {
        return Vec::new();
    }

    let installment = compute_installment(terms.principal, terms.annual_rate_percent, terms.tenure_years);
    let annual_rate = terms.annual_rate();
    let periods = terms.periods();

    let mut rows = Vec::with_capacity(periods as usize);
    let mut balance = terms.principal;
    let mut period_start = start;

    for period in 1..=periods {
        let date = due_date(start, period);
        let days = days_between(period_start, date);
        let accrued = day_count.period_interest(balance, annual_rate, days);
        let settled = settle_period(balance, accrued, installment, period == periods);

        rows.push(AmortizationRow {
            period_index: period,
            date,
            opening_balance: balance,
            payment: settled.payment,
            principal_component: settled.principal,
            interest_component: settled.interest,
            closing_balance: settled.closing_balance,
        });

        balance = settled.closing_balance;
        period_start = date;
        if balance <= Decimal::ZERO {
            break;
        }
    }

    debug!(
        principal = %terms.principal,
        rate = %terms.annual_rate_percent,
        tenure = terms.tenure_years,
        ?day_count,
        rows = rows.len(),
        "built amortization schedule"
    );
    rows
}

/// Group rows by calendar year of their due date.
pub fn annual_rollup(rows: &[AmortizationRow]) -> Vec<AnnualSummary> {
    let mut years: Vec<AnnualSummary> = Vec::new();

    for row in rows {
        let year = row.date.year();
        match years.last_mut() {
            Some(current) if current.year == year => {
                current.periods += 1;
                current.payment += row.payment;
                current.principal_component += row.principal_component;
                current.interest_component += row.interest_component;
                current.closing_balance = row.closing_balance;
            }
            _ => years.push(AnnualSummary {
                year,
                periods: 1,
                opening_balance: row.opening_balance,
                payment: row.payment,
                principal_component: row.principal_component,
                interest_component: row.interest_component,
                closing_balance: row.closing_balance,
            }),
        }
    }

    years
}

/// Sum of interest over at most the first `horizon` rows.
pub fn interest_over(rows: &[AmortizationRow], horizon: usize) -> Money {
    rows.iter().take(horizon).map(|r| r.interest_component).sum()
}

pub fn schedule_totals(rows: &[AmortizationRow], installment: Money) -> ScheduleTotals {
    ScheduleTotals {
        installment,
        total_payment: rows.iter().map(|r| r.payment).sum(),
        total_principal: rows.iter().map(|r| r.principal_component).sum(),
        total_interest: interest_over(rows, rows.len()),
        period_count: rows.len() as u32,
        payoff_date: rows.last().map(|r| r.date),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Installment, monthly schedule, annual roll-up and totals for one loan.
pub fn calculate_amortization(input: &AmortizationInput) -> ComputationOutput<AmortizationOutput> {
    let start = Instant::now();
    let (terms, mut warnings) = input.terms.normalized();

    if terms.start_date.is_none() {
        warnings.push("start_date missing or invalid; schedule is empty".into());
    }

    let installment = compute_installment(terms.principal, terms.annual_rate_percent, terms.tenure_years);
    let monthly = build_schedule_with(&terms, input.day_count);
    let annual = annual_rollup(&monthly);
    let totals = schedule_totals(&monthly, installment);

    let output = AmortizationOutput {
        day_count: input.day_count,
        monthly,
        annual,
        totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Fixed-rate annuity amortization",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "tenure_years": terms.tenure_years,
            "day_count": input.day_count,
            "installment_rounding": "ceiling to 2dp",
            "interest_rounding": "half away from zero to 2dp",
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
