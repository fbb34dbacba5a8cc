use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::levy::entry_costs::{self, EntryCostInput, NetPriceInput};

use crate::input;

#[derive(Args)]
pub struct EntryCostArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the property
    #[arg(long, alias = "price")]
    pub property_price: Option<Decimal>,

    /// Loan amount (for loan instrument duty)
    #[arg(long, alias = "loan")]
    pub loan_amount: Option<Decimal>,
}

#[derive(Args)]
pub struct NetPriceArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Listed price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Financing margin in percent (90 = 90%)
    #[arg(long, alias = "margin")]
    pub margin_percent: Option<Decimal>,

    /// Developer rebate in percent of price
    #[arg(long, alias = "rebate")]
    pub rebate_percent: Option<Decimal>,
}

pub fn run_entry_costs(args: EntryCostArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cost_input: EntryCostInput = match input::from_file_or_stdin(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => EntryCostInput {
            property_price: args.property_price
                .ok_or("--property-price is required (or provide --input)")?,
            loan_amount: args.loan_amount.unwrap_or(Decimal::ZERO),
        },
    };

    let result = entry_costs::calculate_entry_costs(&cost_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_net_price(args: NetPriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let price_input: NetPriceInput = match input::from_file_or_stdin(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => NetPriceInput {
            price: args.price.ok_or("--price is required (or provide --input)")?,
            margin_percent: args.margin_percent
                .ok_or("--margin-percent is required (or provide --input)")?,
            rebate_percent: args.rebate_percent.unwrap_or(Decimal::ZERO),
        },
    };

    let result = entry_costs::calculate_net_price(&price_input);
    Ok(serde_json::to_value(result)?)
}
