use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::DebtfolioError;
use crate::types::{Money, Rate};
use crate::DebtfolioResult;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Extreme rate/term combinations overflow the 96-bit decimal range; that is
/// reported as a `FinancialImpossibility` rather than a panic.
pub fn compound(rate: Decimal, n: u32) -> DebtfolioResult<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result.checked_mul(factor).ok_or_else(|| {
            DebtfolioError::FinancialImpossibility(format!(
                "compounding at {rate} per period over {n} periods exceeds decimal range"
            ))
        })?;
    }
    Ok(result)
}

/// Per-month rate fraction from a nominal annual percentage.
fn monthly_rate(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / dec!(12) / dec!(100)
}

/// Fixed monthly payment for a level-payment amortizing loan.
///
/// A zero rate degenerates to straight division of principal over the term.
pub fn payment_from_principal(
    principal: Money,
    annual_rate_pct: Rate,
    term_months: u32,
) -> DebtfolioResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(DebtfolioError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if term_months == 0 {
        return Err(DebtfolioError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(DebtfolioError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Rate must be non-negative".into(),
        });
    }

    if annual_rate_pct.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    let rate = monthly_rate(annual_rate_pct);
    let factor = compound(rate, term_months)?;
    Ok(principal * rate * factor / (factor - Decimal::ONE))
}

/// Implied principal from a fixed monthly payment (annuity inversion).
///
/// The zero-rate special case is exact: `payment * term`. The result is
/// guarded against non-physical parameter combinations.
pub fn principal_from_payment(
    payment: Money,
    annual_rate_pct: Rate,
    term_months: u32,
) -> DebtfolioResult<Money> {
    if payment <= Decimal::ZERO {
        return Err(DebtfolioError::InvalidInput {
            field: "payment".into(),
            reason: "Payment must be positive".into(),
        });
    }
    if term_months == 0 {
        return Err(DebtfolioError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(DebtfolioError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Rate must be non-negative".into(),
        });
    }

    if annual_rate_pct.is_zero() {
        return Ok(payment * Decimal::from(term_months));
    }

    let rate = monthly_rate(annual_rate_pct);
    let factor = compound(rate, term_months)?;
    let principal = payment * (Decimal::ONE - Decimal::ONE / factor) / rate;

    if principal <= Decimal::ZERO {
        return Err(DebtfolioError::FinancialImpossibility(format!(
            "payment {payment} at {annual_rate_pct}% over {term_months} months implies a non-positive principal"
        )));
    }

    Ok(principal)
}

/// Total interest paid over the full term at a fixed payment.
pub fn total_interest(principal: Money, payment: Money, term_months: u32) -> Money {
    payment * Decimal::from(term_months) - principal
}
