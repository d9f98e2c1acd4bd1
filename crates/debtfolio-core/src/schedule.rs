use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::annuity;
use crate::error::DebtfolioError;
use crate::types::{add_months, with_metadata, AmortizationEntry, ComputationOutput, ExtraPayment, Money, Rate};
use crate::DebtfolioResult;

/// Input for a single-loan amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    /// Nominal annual rate as a percentage (5.99 = 5.99%).
    pub annual_rate_pct: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
}

/// Full amortization schedule for one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub entries: Vec<AmortizationEntry>,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
}

/// Interest and term saved by a set of extra payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentSavings {
    pub interest_saved: Money,
    pub months_saved: u32,
}

/// Build a month-by-month amortization schedule.
///
/// The fixed payment is derived from the annuity formula. Each period splits
/// the payment into interest on the running balance and principal reduction;
/// an extra payment whose date matches the period date (exact match) is added
/// to the principal reduction. The final period never overpays: principal
/// reduction is clamped at the remaining balance, and the schedule ends early
/// once the balance reaches zero. Extra payments therefore shorten the
/// schedule, never lengthen it.
pub fn build_schedule(input: &ScheduleInput) -> DebtfolioResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.principal <= Decimal::ZERO {
        return Err(DebtfolioError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.term_months == 0 {
        return Err(DebtfolioError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }

    let monthly_rate = input.annual_rate_pct / dec!(12) / dec!(100);
    let monthly_payment =
        annuity::payment_from_principal(input.principal, input.annual_rate_pct, input.term_months)?;

    let mut entries = Vec::with_capacity(input.term_months as usize);
    let mut balance = input.principal;
    let mut total_interest_paid = Decimal::ZERO;
    let mut total_principal_paid = Decimal::ZERO;

    for month in 0..input.term_months {
        if balance <= Decimal::ZERO {
            break;
        }

        let date = add_months(input.start_date, month)?;
        let interest = balance * monthly_rate;
        let mut principal_paid = monthly_payment - interest;

        let extra_payment = input
            .extra_payments
            .iter()
            .find(|p| p.date == date)
            .map(|p| p.amount);
        if let Some(amount) = extra_payment {
            principal_paid += amount;
        }

        // Final-period correction: never pay down more than is owed
        if principal_paid > balance {
            principal_paid = balance;
        }

        balance -= principal_paid;
        total_interest_paid += interest;
        total_principal_paid += principal_paid;

        entries.push(AmortizationEntry {
            date,
            payment: monthly_payment,
            principal_portion: principal_paid,
            interest_portion: interest,
            remaining_balance: balance,
            extra_payment,
        });

        if balance <= Decimal::ZERO {
            break;
        }
    }

    let output = ScheduleOutput {
        monthly_payment,
        entries,
        total_interest_paid,
        total_principal_paid,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization Schedule (level payment, monthly periods)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_months": input.term_months,
            "extra_payments": input.extra_payments.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Compare the schedule with and without its extra payments.
///
/// Interest saved is the difference of summed interest portions; months saved
/// is the difference in schedule length.
pub fn savings_from_extra_payments(
    input: &ScheduleInput,
) -> DebtfolioResult<ComputationOutput<ExtraPaymentSavings>> {
    let start = Instant::now();

    let baseline_input = ScheduleInput {
        extra_payments: Vec::new(),
        ..input.clone()
    };
    let baseline = build_schedule(&baseline_input)?.result;
    let accelerated = build_schedule(input)?.result;

    let output = ExtraPaymentSavings {
        interest_saved: baseline.total_interest_paid - accelerated.total_interest_paid,
        months_saved: (baseline.entries.len().saturating_sub(accelerated.entries.len())) as u32,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra-Payment Savings (baseline vs accelerated schedule)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_months": input.term_months,
            "extra_payments": input.extra_payments.len(),
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn car_loan() -> ScheduleInput {
        ScheduleInput {
            principal: dec!(20_000),
            annual_rate_pct: dec!(5),
            term_months: 36,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            extra_payments: Vec::new(),
        }
    }

    #[test]
    fn test_schedule_runs_full_term() {
        let result = build_schedule(&car_loan()).unwrap();
        let sched = &result.result;

        assert_eq!(sched.entries.len(), 36);
        assert!((sched.monthly_payment - dec!(599.42)).abs() < dec!(0.01));

        // Balance decays monotonically to ~0
        let mut prev = dec!(20_000);
        for entry in &sched.entries {
            assert!(entry.remaining_balance <= prev);
            prev = entry.remaining_balance;
        }
        assert!(sched.entries.last().unwrap().remaining_balance < dec!(0.01));
    }

    #[test]
    fn test_entry_split_sums_to_payment() {
        let result = build_schedule(&car_loan()).unwrap();
        // Before the final clamp and absent extras, principal + interest == payment
        for entry in &result.result.entries[..35] {
            let split = entry.principal_portion + entry.interest_portion;
            assert!((split - entry.payment).abs() < dec!(0.0000001));
        }
    }

    #[test]
    fn test_zero_rate_schedule() {
        let input = ScheduleInput {
            principal: dec!(10_000),
            annual_rate_pct: Decimal::ZERO,
            term_months: 10,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            extra_payments: Vec::new(),
        };
        let sched = build_schedule(&input).unwrap().result;

        assert_eq!(sched.entries.len(), 10);
        for entry in &sched.entries {
            assert_eq!(entry.interest_portion, Decimal::ZERO);
            assert_eq!(entry.principal_portion, dec!(1_000));
        }
        assert_eq!(sched.entries.last().unwrap().remaining_balance, Decimal::ZERO);
        assert_eq!(sched.total_interest_paid, Decimal::ZERO);
    }

    #[test]
    fn test_extra_payment_shortens_schedule() {
        let mut input = car_loan();
        input.extra_payments.push(ExtraPayment {
            amount: dec!(5_000),
            date: input.start_date,
        });

        let baseline = build_schedule(&car_loan()).unwrap().result;
        let accelerated = build_schedule(&input).unwrap().result;

        assert!(accelerated.entries.len() < baseline.entries.len());
        assert_eq!(accelerated.entries[0].extra_payment, Some(dec!(5_000)));
        // Extra payment goes entirely to principal on top of the regular split
        assert!(
            accelerated.entries[0].principal_portion
                > baseline.entries[0].principal_portion + dec!(4_999)
        );
    }

    #[test]
    fn test_extra_payment_date_must_match_exactly() {
        let mut input = car_loan();
        input.extra_payments.push(ExtraPayment {
            amount: dec!(5_000),
            date: input.start_date.succ_opt().unwrap(),
        });
        let sched = build_schedule(&input).unwrap().result;
        // Off-by-one-day extra payment is never applied
        assert_eq!(sched.entries.len(), 36);
        assert!(sched.entries.iter().all(|e| e.extra_payment.is_none()));
    }

    #[test]
    fn test_final_period_clamp() {
        let mut input = car_loan();
        // Huge extra payment in month 0 pays the loan off immediately
        input.extra_payments.push(ExtraPayment {
            amount: dec!(100_000),
            date: input.start_date,
        });
        let sched = build_schedule(&input).unwrap().result;

        assert_eq!(sched.entries.len(), 1);
        let only = &sched.entries[0];
        assert_eq!(only.remaining_balance, Decimal::ZERO);
        // Clamped at the opening balance, not payment + extra
        assert_eq!(only.principal_portion, dec!(20_000));
    }

    #[test]
    fn test_savings_from_extra_payments() {
        let mut input = car_loan();
        input.extra_payments.push(ExtraPayment {
            amount: dec!(5_000),
            date: input.start_date,
        });

        let savings = savings_from_extra_payments(&input).unwrap().result;
        assert!(savings.interest_saved > Decimal::ZERO);
        assert!(savings.months_saved > 0);
    }

    #[test]
    fn test_savings_without_extras_is_zero() {
        let savings = savings_from_extra_payments(&car_loan()).unwrap().result;
        assert_eq!(savings.interest_saved, Decimal::ZERO);
        assert_eq!(savings.months_saved, 0);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = car_loan();
        input.principal = Decimal::ZERO;
        assert!(build_schedule(&input).is_err());

        let mut input = car_loan();
        input.term_months = 0;
        assert!(build_schedule(&input).is_err());
    }
}
