use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::flexi::simulator::{self, AdvancePayment, FlexiInput};
use mortgage_core::flexi::state::{FlexiLoanType, PaymentMethod};
use mortgage_core::LoanTerms;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LoanTypeArg {
    Semi,
    Full,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaymentMethodArg {
    AutoDebit,
    Direct,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FlexiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Tenure in years (1-35)
    #[arg(long, alias = "tenure")]
    pub tenure_years: Option<u32>,

    /// Loan start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Flexi variant
    #[arg(long, value_enum, default_value = "semi")]
    pub loan_type: LoanTypeArg,

    /// How installments are paid
    #[arg(long, value_enum, default_value = "auto-debit")]
    pub payment_method: PaymentMethodArg,

    /// Lump sum parked in the account
    #[arg(long)]
    pub advance_amount: Option<Decimal>,

    /// Date of the lump sum (defaults to the start date)
    #[arg(long)]
    pub advance_date: Option<NaiveDate>,
}

pub fn run_flexi(args: FlexiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flexi_input: FlexiInput = match input::from_file_or_stdin(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let start_date = args.start_date
                .ok_or("--start-date is required (or provide --input)")?;
            let advances = match args.advance_amount {
                Some(amount) => vec![AdvancePayment::new(args.advance_date.unwrap_or(start_date), amount)],
                None => Vec::new(),
            };
            FlexiInput {
                terms: LoanTerms::new(
                    args.principal
                        .ok_or("--principal is required (or provide --input)")?,
                    args.annual_rate_percent
                        .ok_or("--annual-rate-percent is required (or provide --input)")?,
                    args.tenure_years
                        .ok_or("--tenure-years is required (or provide --input)")?,
                    Some(start_date),
                ),
                loan_type: match args.loan_type {
                    LoanTypeArg::Semi => FlexiLoanType::SemiFlexi,
                    LoanTypeArg::Full => FlexiLoanType::FullFlexi,
                },
                payment_method: match args.payment_method {
                    PaymentMethodArg::AutoDebit => PaymentMethod::AutoDebit,
                    PaymentMethodArg::Direct => PaymentMethod::Direct,
                },
                advances,
            }
        }
    };

    let result = simulator::simulate_flexi_loan(&flexi_input);
    Ok(serde_json::to_value(result)?)
}
