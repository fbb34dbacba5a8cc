use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::time::Instant;

use mortgage_core::amortization::installment::compute_installment;
use mortgage_core::amortization::schedule::{self, AmortizationInput};
use mortgage_core::calendar::DayCount;
use mortgage_core::reverse::{self, ReverseInput};
use mortgage_core::{with_metadata, LoanTerms};

use crate::input;

/// Loan term flags shared by the installment and schedule commands
#[derive(Args)]
pub struct LoanTermArgs {
    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (4.1 = 4.1%)
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Tenure in years (1-35)
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,

    /// First drawdown date (YYYY-MM-DD); the first installment falls due a month later
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl LoanTermArgs {
    fn into_terms(self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        Ok(LoanTerms::new(
            self.principal
                .ok_or("--principal is required (or provide --input)")?,
            self.annual_rate_percent
                .ok_or("--annual-rate-percent is required (or provide --input)")?,
            self.tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
            self.start_date,
        ))
    }
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct InstallmentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: LoanTermArgs,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: LoanTermArgs,

    /// Interest day count: monthly (rate / 12) or actual365 (daily rest)
    #[arg(long, value_parser = parse_day_count, default_value = "monthly")]
    pub day_count: DayCount,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ReverseArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly payment the borrower can afford
    #[arg(long, alias = "payment")]
    pub monthly_payment: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Tenure in years (1-35)
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,

    /// Loan-to-value ratio (0.90 = 90% financing)
    #[arg(long, alias = "margin")]
    pub margin_ratio: Option<Decimal>,
}

fn parse_day_count(raw: &str) -> Result<DayCount, String> {
    match raw.to_ascii_lowercase().replace(['-', '_', '/'], "").as_str() {
        "monthly" | "30360" => Ok(DayCount::Monthly),
        "actual365" | "act365" | "daily" => Ok(DayCount::Actual365),
        other => Err(format!("unknown day count '{other}' (expected monthly or actual365)")),
    }
}

pub fn run_installment(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let terms: LoanTerms = match input::from_file_or_stdin(args.input.as_deref())? {
        Some(terms) => terms,
        None => args.terms.into_terms()?,
    };

    let (terms, warnings) = terms.normalized();
    let installment = compute_installment(terms.principal, terms.annual_rate_percent, terms.tenure_years);
    let total_payment = installment * Decimal::from(terms.periods());

    let output = with_metadata(
        "Annuity installment, rounded up to the cent",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "tenure_years": terms.tenure_years,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        serde_json::json!({
            "installment": installment,
            "periods": terms.periods(),
            "total_payment": total_payment,
            "total_interest": (total_payment - terms.principal).max(Decimal::ZERO),
        }),
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput = match input::from_file_or_stdin(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => AmortizationInput {
            terms: args.terms.into_terms()?,
            day_count: args.day_count,
        },
    };

    if schedule_input.terms.start_date.is_none() {
        return Err("--start-date is required to build a schedule".into());
    }

    let result = schedule::calculate_amortization(&schedule_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_reverse(args: ReverseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let reverse_input: ReverseInput = match input::from_file_or_stdin(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ReverseInput {
            monthly_payment: args.monthly_payment
                .ok_or("--monthly-payment is required (or provide --input)")?,
            annual_rate_percent: args.annual_rate_percent
                .ok_or("--annual-rate-percent is required (or provide --input)")?,
            tenure_years: args.tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
            margin_ratio: args.margin_ratio.unwrap_or(dec!(0.90)),
        },
    };

    let result = reverse::calculate_reverse_affordability(&reverse_input);
    Ok(serde_json::to_value(result)?)
}
