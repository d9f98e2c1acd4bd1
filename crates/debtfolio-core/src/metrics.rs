use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtfolioError;
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money, Rate};
use crate::DebtfolioResult;

/// Input for portfolio-level debt rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsInput {
    pub loans: Vec<LoanTerms>,
    pub monthly_net_income: Money,
}

/// A named loan payoff milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanMilestone {
    pub name: String,
    pub end_date: NaiveDate,
}

/// Per-loan share of the portfolio, for the size-ordered breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanShare {
    pub name: String,
    pub principal: Money,
    pub monthly_payment: Money,
    pub annual_rate_pct: Rate,
    /// Percentage of total portfolio principal.
    pub share_of_total: Decimal,
}

/// Portfolio-level debt rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtMetricsOutput {
    pub total_monthly_payment: Money,
    /// Total monthly obligation over net income, as a percentage.
    pub debt_to_income_ratio: Decimal,
    /// Average rate weighted by each loan's principal.
    pub weighted_average_rate: Rate,
    pub total_principal: Money,
    /// Nominal full-term end dates, no payoff acceleration assumed.
    pub earliest_payoff: LoanMilestone,
    pub latest_payoff: LoanMilestone,
    pub loans_by_size: Vec<LoanShare>,
}

/// Compute order-insensitive rollups over a loan list.
pub fn debt_metrics(input: &MetricsInput) -> DebtfolioResult<ComputationOutput<DebtMetricsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.loans.is_empty() {
        return Err(DebtfolioError::InsufficientData(
            "Debt metrics require at least one loan".into(),
        ));
    }
    if input.monthly_net_income.is_zero() {
        return Err(DebtfolioError::DivisionByZero {
            context: "debt-to-income ratio (monthly_net_income is zero)".into(),
        });
    }
    if input.monthly_net_income < Decimal::ZERO {
        return Err(DebtfolioError::InvalidInput {
            field: "monthly_net_income".into(),
            reason: "Net income must be positive".into(),
        });
    }

    let total_monthly_payment: Money = input
        .loans
        .iter()
        .map(|loan| loan.monthly_equivalent_payment())
        .sum();
    let debt_to_income_ratio = total_monthly_payment / input.monthly_net_income * dec!(100);

    let total_principal: Money = input.loans.iter().map(|loan| loan.principal).sum();
    let weighted_average_rate = if total_principal.is_zero() {
        warnings.push("Total principal is zero; weighted average rate reported as 0".into());
        Decimal::ZERO
    } else {
        input
            .loans
            .iter()
            .map(|loan| loan.annual_rate_pct * loan.principal)
            .sum::<Decimal>()
            / total_principal
    };

    let mut milestones = Vec::with_capacity(input.loans.len());
    for loan in &input.loans {
        milestones.push(LoanMilestone {
            name: loan.name.clone(),
            end_date: loan.end_date()?,
        });
    }
    // Non-empty by the validation above
    let earliest_payoff = milestones
        .iter()
        .min_by_key(|m| m.end_date)
        .cloned()
        .ok_or_else(|| DebtfolioError::InsufficientData("No payoff milestones".into()))?;
    let latest_payoff = milestones
        .iter()
        .max_by_key(|m| m.end_date)
        .cloned()
        .ok_or_else(|| DebtfolioError::InsufficientData("No payoff milestones".into()))?;

    let mut loans_by_size: Vec<LoanShare> = input
        .loans
        .iter()
        .map(|loan| LoanShare {
            name: loan.name.clone(),
            principal: loan.principal,
            monthly_payment: loan.monthly_equivalent_payment(),
            annual_rate_pct: loan.annual_rate_pct,
            share_of_total: if total_principal.is_zero() {
                Decimal::ZERO
            } else {
                loan.principal / total_principal * dec!(100)
            },
        })
        .collect();
    loans_by_size.sort_by(|a, b| b.principal.cmp(&a.principal));

    let output = DebtMetricsOutput {
        total_monthly_payment,
        debt_to_income_ratio,
        weighted_average_rate,
        total_principal,
        earliest_payoff,
        latest_payoff,
        loans_by_size,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Metrics (normalized monthly obligations, principal-weighted rate)",
        &serde_json::json!({
            "loans": input.loans.len(),
            "monthly_net_income": input.monthly_net_income.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentFrequency;
    use rust_decimal_macros::dec;

    fn sample_loans() -> Vec<LoanTerms> {
        vec![
            LoanTerms {
                name: "car".into(),
                principal: dec!(20_000),
                annual_rate_pct: dec!(5),
                term_months: 36,
                regular_payment: dec!(500),
                payment_frequency: PaymentFrequency::Monthly,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                extra_payments: Vec::new(),
            },
            LoanTerms {
                name: "bike".into(),
                principal: dec!(5_000),
                annual_rate_pct: dec!(8),
                term_months: 24,
                regular_payment: dec!(300),
                payment_frequency: PaymentFrequency::Biweekly,
                start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                extra_payments: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_total_monthly_payment_normalizes_biweekly() {
        let input = MetricsInput {
            loans: sample_loans(),
            monthly_net_income: dec!(3_000),
        };
        let m = debt_metrics(&input).unwrap().result;

        // 500 + 300 * 26/12 = 500 + 650
        assert_eq!(m.total_monthly_payment, dec!(1_150));
    }

    #[test]
    fn test_debt_to_income_ratio() {
        let input = MetricsInput {
            loans: sample_loans(),
            monthly_net_income: dec!(3_000),
        };
        let m = debt_metrics(&input).unwrap().result;

        // 1150 / 3000 * 100 = 38.33%
        assert_eq!(m.debt_to_income_ratio.round_dp(2), dec!(38.33));
    }

    #[test]
    fn test_weighted_average_rate() {
        let input = MetricsInput {
            loans: sample_loans(),
            monthly_net_income: dec!(3_000),
        };
        let m = debt_metrics(&input).unwrap().result;

        // (5 * 20000 + 8 * 5000) / 25000 = 5.6
        assert_eq!(m.weighted_average_rate, dec!(5.6));
        assert_eq!(m.total_principal, dec!(25_000));
    }

    #[test]
    fn test_payoff_milestones() {
        let input = MetricsInput {
            loans: sample_loans(),
            monthly_net_income: dec!(3_000),
        };
        let m = debt_metrics(&input).unwrap().result;

        // car: 2025-01-01 + 36 months; bike: 2025-06-01 + 24 months
        assert_eq!(m.earliest_payoff.name, "bike");
        assert_eq!(
            m.earliest_payoff.end_date,
            NaiveDate::from_ymd_opt(2027, 6, 1).unwrap()
        );
        assert_eq!(m.latest_payoff.name, "car");
        assert_eq!(
            m.latest_payoff.end_date,
            NaiveDate::from_ymd_opt(2028, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_loans_by_size_descending() {
        let input = MetricsInput {
            loans: sample_loans(),
            monthly_net_income: dec!(3_000),
        };
        let m = debt_metrics(&input).unwrap().result;

        assert_eq!(m.loans_by_size[0].name, "car");
        assert_eq!(m.loans_by_size[0].share_of_total, dec!(80));
        assert_eq!(m.loans_by_size[1].name, "bike");
        assert_eq!(m.loans_by_size[1].share_of_total, dec!(20));
        assert_eq!(m.loans_by_size[1].monthly_payment, dec!(650));
    }

    #[test]
    fn test_empty_loans_error() {
        let input = MetricsInput {
            loans: Vec::new(),
            monthly_net_income: dec!(3_000),
        };
        assert!(matches!(
            debt_metrics(&input),
            Err(DebtfolioError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_zero_income_error() {
        let input = MetricsInput {
            loans: sample_loans(),
            monthly_net_income: Decimal::ZERO,
        };
        assert!(matches!(
            debt_metrics(&input),
            Err(DebtfolioError::DivisionByZero { .. })
        ));
    }
}
