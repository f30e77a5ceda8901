//! Closed-form level-payment annuity math shared by the amortization engine
//! and the affordability inverse. All arithmetic is checked: an overflow is
//! reported as `OutOfRange` instead of panicking.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::EmiError;
use crate::types::{Money, Percent, Rate};
use crate::EmiResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Convert an annual percentage rate (8.5) into a monthly decimal rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / (MONTHS_PER_YEAR * PERCENT)
}

/// Compound growth factor (1 + r)^n.
pub fn growth_factor(rate: Rate, periods: u32) -> EmiResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| overflow("growth factor"))
}

/// Level installment that fully repays `principal` over `periods` at `rate`
/// per period: P·r·(1+r)^n / ((1+r)^n − 1).
pub fn installment(principal: Money, rate: Rate, periods: u32) -> EmiResult<Money> {
    if periods == 0 {
        return Err(EmiError::invalid(
            "tenure_months",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = growth_factor(rate, periods)?;
    let growth = factor - Decimal::ONE;
    if growth.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    // factor / growth stays near 1, so divide first to keep the product small.
    let ratio = factor
        .checked_div(growth)
        .ok_or_else(|| overflow("annuity ratio"))?;

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(ratio))
        .ok_or_else(|| overflow("installment"))
}

/// Principal repaid by `periods` level installments at `rate` per period:
/// A·((1+r)^n − 1) / (r·(1+r)^n).
pub fn present_value(installment: Money, rate: Rate, periods: u32) -> EmiResult<Money> {
    if periods == 0 {
        return Err(EmiError::invalid(
            "tenure_months",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return installment
            .checked_mul(Decimal::from(periods))
            .ok_or_else(|| overflow("present value"));
    }

    let factor = growth_factor(rate, periods)?;
    let denom = rate
        .checked_mul(factor)
        .ok_or_else(|| overflow("present value"))?;
    let annuity_factor = (factor - Decimal::ONE)
        .checked_div(denom)
        .ok_or_else(|| overflow("present value"))?;

    installment
        .checked_mul(annuity_factor)
        .ok_or_else(|| overflow("present value"))
}

fn overflow(context: &str) -> EmiError {
    EmiError::out_of_range(
        "annual_rate_percent",
        format!("arithmetic overflow computing {context}"),
    )
}
