use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::annuity;
use crate::types::{LoanTerms, Money, Rate};

/// Point-in-time standing of a single loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanProgress {
    pub elapsed_months: i32,
    pub progress_percent: Decimal,
    pub remaining_balance: Money,
}

/// Whole-calendar-month difference, ignoring day-of-month.
///
/// A loan started Jan 31 evaluated Feb 1 counts one elapsed month. This is a
/// known approximation carried over deliberately; switching to day-exact math
/// would change every downstream number.
pub(crate) fn elapsed_calendar_months(start: NaiveDate, as_of: NaiveDate) -> i32 {
    (as_of.year() - start.year()) * 12 + (as_of.month() as i32 - start.month() as i32)
}

/// Replay the per-period balance decay for `months` periods without
/// materializing schedule entries. Clamped at zero each step.
pub(crate) fn replay_balance(principal: Money, monthly_rate: Rate, payment: Money, months: u32) -> Money {
    let mut balance = principal;
    for _ in 0..months {
        if balance <= Decimal::ZERO {
            break;
        }
        let interest = balance * monthly_rate;
        let principal_paid = payment - interest;
        balance = (balance - principal_paid).max(Decimal::ZERO);
    }
    balance
}

/// Progress percent and remaining balance for a loan as of a date.
///
/// The balance replays the standard no-extra-payment amortization at the
/// derived fixed payment for `min(elapsed, term)` periods, so it agrees with
/// the corresponding `build_schedule` entry. An as-of date before the start
/// clamps to 0% and the full principal; past the term end it clamps to 100%
/// and a zero balance. Malformed loans (zero term or principal) degenerate to
/// the same untouched result rather than erroring; callers validate upstream.
pub fn progress_as_of(loan: &LoanTerms, as_of: NaiveDate) -> LoanProgress {
    let elapsed_months = elapsed_calendar_months(loan.start_date, as_of);

    if loan.term_months == 0 {
        return LoanProgress {
            elapsed_months,
            progress_percent: Decimal::ZERO,
            remaining_balance: loan.principal,
        };
    }

    let progress_percent = (Decimal::from(elapsed_months) / Decimal::from(loan.term_months)
        * dec!(100))
    .clamp(Decimal::ZERO, dec!(100));

    let periods = elapsed_months.clamp(0, loan.term_months as i32) as u32;
    let remaining_balance =
        match annuity::payment_from_principal(loan.principal, loan.annual_rate_pct, loan.term_months) {
            Ok(payment) => replay_balance(loan.principal, loan.monthly_rate(), payment, periods),
            Err(_) => loan.principal,
        };

    LoanProgress {
        elapsed_months,
        progress_percent,
        remaining_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{build_schedule, ScheduleInput};
    use crate::types::PaymentFrequency;
    use rust_decimal_macros::dec;

    fn car_loan() -> LoanTerms {
        LoanTerms {
            name: "car".into(),
            principal: dec!(20_000),
            annual_rate_pct: dec!(5),
            term_months: 36,
            regular_payment: dec!(599.42),
            payment_frequency: PaymentFrequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            extra_payments: Vec::new(),
        }
    }

    #[test]
    fn test_halfway_progress() {
        let loan = car_loan();
        let as_of = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let p = progress_as_of(&loan, as_of);

        assert_eq!(p.elapsed_months, 18);
        assert_eq!(p.progress_percent, dec!(50));
        assert!(p.remaining_balance > Decimal::ZERO);
        assert!(p.remaining_balance < loan.principal);
    }

    #[test]
    fn test_day_of_month_is_ignored() {
        let loan = car_loan();
        // Started the 15th, evaluated the 1st of the next month: still one month
        let p = progress_as_of(&loan, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(p.elapsed_months, 1);
    }

    #[test]
    fn test_before_start_clamps_to_zero() {
        let loan = car_loan();
        let p = progress_as_of(&loan, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());

        assert!(p.elapsed_months < 0);
        assert_eq!(p.progress_percent, Decimal::ZERO);
        assert_eq!(p.remaining_balance, loan.principal);
    }

    #[test]
    fn test_past_term_clamps_to_complete() {
        let loan = car_loan();
        let p = progress_as_of(&loan, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());

        assert_eq!(p.progress_percent, dec!(100));
        assert!(p.remaining_balance < dec!(0.01));
    }

    #[test]
    fn test_matches_schedule_balance() {
        let loan = car_loan();
        let schedule_input = ScheduleInput {
            principal: loan.principal,
            annual_rate_pct: loan.annual_rate_pct,
            term_months: loan.term_months,
            start_date: loan.start_date,
            extra_payments: Vec::new(),
        };
        let sched = build_schedule(&schedule_input).unwrap().result;

        for elapsed in [1usize, 6, 18, 36] {
            let as_of = crate::types::add_months(loan.start_date, elapsed as u32).unwrap();
            let p = progress_as_of(&loan, as_of);
            assert_eq!(
                p.remaining_balance,
                sched.entries[elapsed - 1].remaining_balance,
                "mismatch at {elapsed} months"
            );
        }
    }

    #[test]
    fn test_zero_term_degenerates() {
        let mut loan = car_loan();
        loan.term_months = 0;
        let p = progress_as_of(&loan, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(p.progress_percent, Decimal::ZERO);
        assert_eq!(p.remaining_balance, loan.principal);
    }
}
