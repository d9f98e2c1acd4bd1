use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtfolioError;
use crate::DebtfolioResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Interest rates expressed as annual percentages (5.99 = 5.99%/year).
pub type Rate = Decimal;

/// How often a loan's regular payment is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Biweekly,
}

impl PaymentFrequency {
    /// Convert a payment at this frequency to its monthly equivalent.
    ///
    /// Biweekly payments scale by 26/12 (26 biweekly periods per year over
    /// 12 months per year). This is the only place the conversion lives.
    pub fn monthly_equivalent(&self, payment: Money) -> Money {
        match self {
            PaymentFrequency::Monthly => payment,
            PaymentFrequency::Biweekly => payment * dec!(26) / dec!(12),
        }
    }
}

/// The canonical loan record used by every computation. External stores may
/// use other field casings; renaming happens at their adapter, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub name: String,
    pub principal: Money,
    /// Nominal annual rate as a percentage (5.99 = 5.99%).
    pub annual_rate_pct: Rate,
    pub term_months: u32,
    pub regular_payment: Money,
    pub payment_frequency: PaymentFrequency,
    /// Date the first period begins.
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_payments: Vec<ExtraPayment>,
}

impl LoanTerms {
    /// Per-month interest rate as a fraction.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_pct / dec!(12) / dec!(100)
    }

    /// Regular payment normalized to a monthly figure.
    pub fn monthly_equivalent_payment(&self) -> Money {
        self.payment_frequency.monthly_equivalent(self.regular_payment)
    }

    /// Nominal end date assuming the loan runs its full term.
    pub fn end_date(&self) -> DebtfolioResult<NaiveDate> {
        add_months(self.start_date, self.term_months)
    }
}

/// An out-of-band principal payment applied in the month matching `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub amount: Money,
    pub date: NaiveDate,
}

/// One scheduled period of an amortization schedule.
///
/// `principal_portion + interest_portion == payment` before any extra
/// payment is folded in, and `remaining_balance` never increases across the
/// schedule for an amortizing loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub date: NaiveDate,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<Money>,
}

/// One simulated month of a portfolio payoff projection.
///
/// `total_debt` always equals the sum of `debt_by_loan` values. The map is
/// ordered so serialized output is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub date: NaiveDate,
    pub total_debt: Money,
    pub net_income: Money,
    pub debt_by_loan: BTreeMap<String, Money>,
}

/// Calendar-month addition (day-of-month clamps at short month ends).
pub fn add_months(date: NaiveDate, months: u32) -> DebtfolioResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| {
            DebtfolioError::DateError(format!("{date} plus {months} months overflows the calendar"))
        })
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biweekly_normalization() {
        let monthly = PaymentFrequency::Biweekly.monthly_equivalent(dec!(300));
        assert_eq!(monthly, dec!(650));
        assert_eq!(PaymentFrequency::Monthly.monthly_equivalent(dec!(300)), dec!(300));
    }

    #[test]
    fn test_add_months_clamps_day() {
        let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let feb = add_months(jan31, 1).unwrap();
        assert_eq!(feb, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_end_date_full_term() {
        let loan = LoanTerms {
            name: "car".into(),
            principal: dec!(20_000),
            annual_rate_pct: dec!(5),
            term_months: 36,
            regular_payment: dec!(599.42),
            payment_frequency: PaymentFrequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            extra_payments: Vec::new(),
        };
        assert_eq!(
            loan.end_date().unwrap(),
            NaiveDate::from_ymd_opt(2027, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_payment_frequency_wire_names() {
        let f: PaymentFrequency = serde_json::from_str("\"biweekly\"").unwrap();
        assert_eq!(f, PaymentFrequency::Biweekly);
        assert_eq!(serde_json::to_string(&PaymentFrequency::Monthly).unwrap(), "\"monthly\"");
    }
}
