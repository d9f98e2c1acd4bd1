use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use debtfolio_core::annuity;

/// Arguments for the fixed-payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Decimal,

    /// Nominal annual rate as a percentage (5.99 = 5.99%)
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Decimal,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: u32,
}

/// Arguments for the principal inversion
#[derive(Args)]
pub struct PrincipalArgs {
    /// Fixed monthly payment
    #[arg(long)]
    pub payment: Decimal,

    /// Nominal annual rate as a percentage (5.99 = 5.99%)
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Decimal,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: u32,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment =
        annuity::payment_from_principal(args.principal, args.annual_rate_pct, args.term_months)?;
    let total_interest = annuity::total_interest(args.principal, payment, args.term_months);

    Ok(json!({
        "result": {
            "monthly_payment": payment.to_string(),
            "total_interest": total_interest.to_string(),
        }
    }))
}

pub fn run_principal(args: PrincipalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let principal =
        annuity::principal_from_payment(args.payment, args.annual_rate_pct, args.term_months)?;
    let total_interest = annuity::total_interest(principal, args.payment, args.term_months);

    Ok(json!({
        "result": {
            "principal": principal.to_string(),
            "total_interest": total_interest.to_string(),
        }
    }))
}
