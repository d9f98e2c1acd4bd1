mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::annuity::{PaymentArgs, PrincipalArgs};
use commands::metrics::MetricsArgs;
use commands::progress::ProgressArgs;
use commands::project::ProjectArgs;
use commands::schedule::{SavingsArgs, ScheduleArgs};

/// Personal loan amortization and payoff projection
#[derive(Parser)]
#[command(
    name = "debtfolio",
    version,
    about = "Personal loan amortization and payoff projection",
    long_about = "Compute amortization schedules, loan progress, portfolio \
                  debt-free projections, and aggregate debt metrics with \
                  decimal precision. Inputs come from flags, JSON files, or \
                  piped JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed monthly payment from principal, rate, and term
    Payment(PaymentArgs),
    /// Implied principal from a fixed monthly payment
    Principal(PrincipalArgs),
    /// Month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Interest and months saved by extra payments
    Savings(SavingsArgs),
    /// Progress and remaining balance for a single loan
    Progress(ProgressArgs),
    /// Debt-free projection across a loan portfolio
    Project(ProjectArgs),
    /// Aggregate debt metrics for a loan portfolio
    Metrics(MetricsArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::annuity::run_payment(args),
        Commands::Principal(args) => commands::annuity::run_principal(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Savings(args) => commands::schedule::run_savings(args),
        Commands::Progress(args) => commands::progress::run_progress(args),
        Commands::Project(args) => commands::project::run_project(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Version => {
            println!("debtfolio {}", env!("CARGO_PKG_VERSION"));
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
