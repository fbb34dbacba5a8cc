mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use commands::affordability::{AffordabilityArgs, IncomeArgs, MitigationArgs};
use commands::costs::{EntryCostArgs, NetPriceArgs};
use commands::flexi::FlexiArgs;
use commands::loan::{InstallmentArgs, ReverseArgs, ScheduleArgs};

/// Mortgage calculations with decimal precision
#[derive(Parser)]
#[command(
    name = "mcalc",
    version,
    about = "Mortgage calculations with decimal precision",
    long_about = "A CLI for mortgage calculations: installments, amortization schedules, \
                  entry costs, DSR affordability, income recognition, reverse affordability \
                  and offset (flexi) loan simulation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Lending policy overrides (JSON or YAML), merged over the defaults
    #[arg(long, env = "MCALC_HANDBOOK", global = true)]
    handbook: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly installment for a fixed-rate loan
    Installment(InstallmentArgs),
    /// Full amortization schedule with an annual roll-up
    Schedule(ScheduleArgs),
    /// Legal fee, transfer duty and loan duty for a purchase
    EntryCosts(EntryCostArgs),
    /// Loan amount, rebated price and cash back
    NetPrice(NetPriceArgs),
    /// DSR / NDI assessment with bank tier placement
    Affordability(AffordabilityArgs),
    /// Recognised income after statutory deductions and haircuts
    Income(IncomeArgs),
    /// Rescue scenarios for a stretched case
    Mitigation(MitigationArgs),
    /// Maximum loan and property price from an affordable payment
    Reverse(ReverseArgs),
    /// Simulate an offset (flexi) loan against its plain schedule
    Flexi(FlexiArgs),
    /// Print the effective lending policy handbook
    Handbook,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let handbook = match input::handbook::load(cli.handbook.as_deref()) {
        Ok(handbook) => handbook,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Installment(args) => commands::loan::run_installment(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::EntryCosts(args) => commands::costs::run_entry_costs(args),
        Commands::NetPrice(args) => commands::costs::run_net_price(args),
        Commands::Affordability(args) => commands::affordability::run_affordability(args, &handbook),
        Commands::Income(args) => commands::affordability::run_income(args, &handbook),
        Commands::Mitigation(args) => commands::affordability::run_mitigation(args, &handbook),
        Commands::Reverse(args) => commands::loan::run_reverse(args),
        Commands::Flexi(args) => commands::flexi::run_flexi(args),
        Commands::Handbook => commands::handbook::run_handbook(&handbook),
        Commands::Version => {
            println!("mcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
