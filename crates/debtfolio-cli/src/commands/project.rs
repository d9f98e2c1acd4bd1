use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use debtfolio_core::projection::{self, ProjectionInput};

use crate::input;

/// Arguments for the portfolio debt-free projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to JSON input file ({ loans, monthly_net_income, as_of?, horizon_years? })
    #[arg(long)]
    pub input: Option<String>,

    /// Reference date (defaults to today if absent from the input too)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Projection horizon in years
    #[arg(long)]
    pub horizon_years: Option<u32>,

    /// Monthly net income override
    #[arg(long)]
    pub net_income: Option<Decimal>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut value: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("project requires --input or piped JSON".into());
    };

    let obj = value
        .as_object_mut()
        .ok_or("projection input must be a JSON object")?;

    // Flag overrides, then a wall-clock default for the reference date
    if let Some(as_of) = args.as_of {
        obj.insert("as_of".into(), json!(as_of));
    } else if !obj.contains_key("as_of") {
        obj.insert("as_of".into(), json!(chrono::Local::now().date_naive()));
    }
    if let Some(horizon) = args.horizon_years {
        obj.insert("horizon_years".into(), json!(horizon));
    }
    if let Some(net_income) = args.net_income {
        obj.insert("monthly_net_income".into(), json!(net_income.to_string()));
    }

    let projection_input: ProjectionInput = serde_json::from_value(value)?;
    let output = projection::project_portfolio(&projection_input)?;
    Ok(serde_json::to_value(&output)?)
}
