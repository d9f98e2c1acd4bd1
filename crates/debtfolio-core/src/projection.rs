use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtfolioError;
use crate::progress::{elapsed_calendar_months, replay_balance};
use crate::types::{add_months, with_metadata, ComputationOutput, LoanTerms, Money, ProjectionPoint};
use crate::DebtfolioResult;

/// Assumed annual net-income growth, applied at each January boundary.
/// A policy constant, not derived from data.
const ANNUAL_INCOME_GROWTH: Decimal = dec!(0.02);

pub const DEFAULT_HORIZON_YEARS: u32 = 30;

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_YEARS
}

/// Input for a portfolio payoff projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub loans: Vec<LoanTerms>,
    pub monthly_net_income: Money,
    /// Reference "today". Injected so output is deterministic under test.
    pub as_of: NaiveDate,
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
}

/// Monthly projection series plus the derived debt-free summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub points: Vec<ProjectionPoint>,
    /// First month the portfolio reaches zero debt. `None` means the horizon
    /// was reached first ("more than `horizon_years` away", not an error).
    pub debt_free_date: Option<NaiveDate>,
    pub years_to_debt_free: Option<Decimal>,
}

/// Simulate the whole loan portfolio forward one calendar month at a time.
///
/// Each loan decays at its own monthly rate under its frequency-normalized
/// regular payment. When a balance hits zero its payment is permanently added
/// to net income — freed payment capacity is modeled as income, not
/// redirected at the remaining debts. Net income also grows 2% at every
/// January boundary. The simulation stops at zero total debt or at the
/// horizon, whichever comes first, so the series never exceeds
/// `horizon_years * 12 + 1` points.
pub fn project_portfolio(
    input: &ProjectionInput,
) -> DebtfolioResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.monthly_net_income < Decimal::ZERO {
        return Err(DebtfolioError::InvalidInput {
            field: "monthly_net_income".into(),
            reason: "Net income must be non-negative".into(),
        });
    }

    let horizon_end = add_months(input.as_of, input.horizon_years * 12)?;

    // Current balance per loan as of the reference date. Loans that have not
    // started yet carry no debt and are excluded outright.
    let mut debt_by_loan: BTreeMap<String, Money> = BTreeMap::new();
    for loan in &input.loans {
        if loan.start_date > input.as_of {
            warnings.push(format!(
                "Loan '{}' starts {} and is excluded from the projection",
                loan.name, loan.start_date
            ));
            continue;
        }

        let elapsed = elapsed_calendar_months(loan.start_date, input.as_of);
        let periods = elapsed.clamp(0, loan.term_months as i32) as u32;
        let payment = loan.monthly_equivalent_payment();
        let balance = replay_balance(loan.principal, loan.monthly_rate(), payment, periods);

        if balance > Decimal::ZERO {
            if payment <= balance * loan.monthly_rate() {
                warnings.push(format!(
                    "Loan '{}': payment does not cover monthly interest; balance will not amortize",
                    loan.name
                ));
            }
            if debt_by_loan.insert(loan.name.clone(), balance).is_some() {
                warnings.push(format!(
                    "Duplicate loan name '{}'; later entry overwrites the earlier one",
                    loan.name
                ));
            }
        }
    }

    let mut total_debt: Money = debt_by_loan.values().copied().sum();
    let mut net_income = input.monthly_net_income;
    let mut current_date = input.as_of;

    let mut points = vec![ProjectionPoint {
        date: current_date,
        total_debt,
        net_income,
        debt_by_loan: debt_by_loan.clone(),
    }];

    while current_date < horizon_end && total_debt > Decimal::ZERO {
        current_date = add_months(current_date, 1)?;

        if current_date.month() == 1 {
            net_income *= Decimal::ONE + ANNUAL_INCOME_GROWTH;
        }

        for (name, balance) in debt_by_loan.iter_mut() {
            let Some(loan) = input.loans.iter().find(|l| &l.name == name) else {
                continue;
            };
            if *balance <= Decimal::ZERO {
                continue;
            }

            let payment = loan.monthly_equivalent_payment();
            let interest = *balance * loan.monthly_rate();
            let principal_paid = payment - interest;
            let next = (*balance - principal_paid).max(Decimal::ZERO);

            if next.is_zero() {
                // Freed payment capacity: permanently added to income
                net_income += payment;
            }
            *balance = next;
        }

        total_debt = debt_by_loan.values().copied().sum();
        points.push(ProjectionPoint {
            date: current_date,
            total_debt,
            net_income,
            debt_by_loan: debt_by_loan.clone(),
        });
    }

    let debt_free_date = points.iter().find(|p| p.total_debt.is_zero()).map(|p| p.date);
    let years_to_debt_free = debt_free_date.map(|d| {
        let days = (d - input.as_of).num_days();
        (Decimal::from(days) / dec!(365.25)).round_dp(1)
    });

    let output = ProjectionOutput {
        points,
        debt_free_date,
        years_to_debt_free,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-Free Projection (monthly portfolio decay, freed payments to income)",
        &serde_json::json!({
            "loans": input.loans.len(),
            "monthly_net_income": input.monthly_net_income.to_string(),
            "as_of": input.as_of.to_string(),
            "horizon_years": input.horizon_years,
            "annual_income_growth": ANNUAL_INCOME_GROWTH.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
