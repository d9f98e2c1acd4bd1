use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use debtfolio_core::progress;
use debtfolio_core::types::{LoanTerms, PaymentFrequency};

use crate::input;

/// Arguments for the single-loan progress estimate
#[derive(Args)]
pub struct ProgressArgs {
    /// Path to JSON input file holding the loan record (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan name
    #[arg(long, default_value = "loan")]
    pub name: String,

    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate as a percentage (5.99 = 5.99%)
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Regular payment per period
    #[arg(long)]
    pub regular_payment: Option<Decimal>,

    /// Payment frequency: monthly or biweekly
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// First period start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Reference date (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

fn parse_frequency(s: &str) -> Result<PaymentFrequency, Box<dyn std::error::Error>> {
    match s {
        "monthly" => Ok(PaymentFrequency::Monthly),
        "biweekly" => Ok(PaymentFrequency::Biweekly),
        other => Err(format!("unknown payment frequency '{other}' (expected monthly or biweekly)").into()),
    }
}

fn resolve_loan(args: &ProgressArgs) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    Ok(LoanTerms {
        name: args.name.clone(),
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_pct: args
            .annual_rate_pct
            .ok_or("--annual-rate-pct is required (or provide --input)")?,
        term_months: args
            .term_months
            .ok_or("--term-months is required (or provide --input)")?,
        regular_payment: args
            .regular_payment
            .ok_or("--regular-payment is required (or provide --input)")?,
        payment_frequency: parse_frequency(&args.frequency)?,
        start_date: args
            .start_date
            .ok_or("--start-date is required (or provide --input)")?,
        extra_payments: Vec::new(),
    })
}

pub fn run_progress(args: ProgressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let loan = resolve_loan(&args)?;
    let standing = progress::progress_as_of(&loan, as_of);

    Ok(json!({
        "result": serde_json::to_value(&standing)?,
        "as_of": as_of.to_string(),
    }))
}
