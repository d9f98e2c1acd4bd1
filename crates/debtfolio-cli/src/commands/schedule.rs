use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use debtfolio_core::schedule::{self, ScheduleInput};

use crate::input;

/// Arguments for the amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate as a percentage (5.99 = 5.99%)
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// First period start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for the extra-payment savings comparison
#[derive(Args)]
pub struct SavingsArgs {
    /// Path to JSON input file (a ScheduleInput with extra_payments)
    #[arg(long)]
    pub input: Option<String>,
}

fn resolve_input(args: &ScheduleArgs) -> Result<ScheduleInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    Ok(ScheduleInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_pct: args
            .annual_rate_pct
            .ok_or("--annual-rate-pct is required (or provide --input)")?,
        term_months: args
            .term_months
            .ok_or("--term-months is required (or provide --input)")?,
        start_date: args
            .start_date
            .ok_or("--start-date is required (or provide --input)")?,
        extra_payments: Vec::new(),
    })
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_input(&args)?;
    let output = schedule::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(&output)?)
}

pub fn run_savings(args: SavingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("savings requires --input or piped JSON".into());
    };

    let output = schedule::savings_from_extra_payments(&schedule_input)?;
    Ok(serde_json::to_value(&output)?)
}
