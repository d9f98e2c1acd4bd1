use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use debtfolio_core::metrics::{self, MetricsInput};

use crate::input;

/// Arguments for the aggregate debt metrics
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON input file ({ loans, monthly_net_income })
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly net income override
    #[arg(long)]
    pub net_income: Option<Decimal>,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut value: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("metrics requires --input or piped JSON".into());
    };

    let obj = value
        .as_object_mut()
        .ok_or("metrics input must be a JSON object")?;
    if let Some(net_income) = args.net_income {
        obj.insert("monthly_net_income".into(), json!(net_income.to_string()));
    }

    let metrics_input: MetricsInput = serde_json::from_value(value)?;
    let output = metrics::debt_metrics(&metrics_input)?;
    Ok(serde_json::to_value(&output)?)
}
