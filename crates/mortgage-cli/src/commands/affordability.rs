use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::affordability::dsr::{self, AffordabilityInput};
use mortgage_core::affordability::income::{self, IncomeInput};
use mortgage_core::affordability::mitigation::{self, MitigationInput};
use mortgage_core::Handbook;

use crate::input;

#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total monthly commitments, including the new installment
    #[arg(long, alias = "commitment")]
    pub total_commitment: Option<Decimal>,

    /// Net monthly income
    #[arg(long, alias = "income")]
    pub net_income: Option<Decimal>,

    /// Minimum monthly cost of living that must remain after commitments
    #[arg(long, alias = "living-cost")]
    pub living_cost_baseline: Option<Decimal>,
}

/// Income recognition takes a list of income lines, so only file or stdin input
#[derive(Args)]
pub struct IncomeArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Mitigation takes a commitment stack, so only file or stdin input
#[derive(Args)]
pub struct MitigationArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_affordability(args: AffordabilityArgs, handbook: &Handbook) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = match input::from_file_or_stdin(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => AffordabilityInput {
            total_commitment: args.total_commitment
                .ok_or("--total-commitment is required (or provide --input)")?,
            net_income: args.net_income
                .ok_or("--net-income is required (or provide --input)")?,
            living_cost_baseline: args.living_cost_baseline.unwrap_or(Decimal::ZERO),
        },
    };

    let result = dsr::assess_affordability(&afford_input, handbook);
    Ok(serde_json::to_value(result)?)
}

pub fn run_income(args: IncomeArgs, handbook: &Handbook) -> Result<Value, Box<dyn std::error::Error>> {
    let income_input: IncomeInput = input::from_file_or_stdin(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for income recognition")?;
    let result = income::recognize_income(&income_input, handbook);
    Ok(serde_json::to_value(result)?)
}

pub fn run_mitigation(args: MitigationArgs, handbook: &Handbook) -> Result<Value, Box<dyn std::error::Error>> {
    let mitigation_input: MitigationInput = input::from_file_or_stdin(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for mitigation scenarios")?;
    let result = mitigation::simulate_mitigation(&mitigation_input, handbook);
    Ok(serde_json::to_value(result)?)
}
