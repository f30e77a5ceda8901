//! Loan affordability: the largest principal a given monthly installment can
//! repay at a given rate and tenure. This is the inverse of the EMI formula.

use rust_decimal::prelude::RoundingStrategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::engine::{compute_schedule_with, LoanTerms};
use crate::annuity;
use crate::config::EngineConfig;
use crate::error::EmiError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::EmiResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityInput {
    /// Monthly installment the borrower can afford.
    pub installment: Money,
    #[serde(rename = "annualRate")]
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EngineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityOutput {
    /// Largest principal, rounded down to the minor currency unit.
    pub max_principal: Money,
    /// Installment for `max_principal`; never above the requested installment
    /// by more than one minor unit.
    pub emi: Money,
    pub total_interest: Money,
    pub total_amount: Money,
}

pub fn max_principal(
    input: &AffordabilityInput,
) -> EmiResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let config = input.config.clone().unwrap_or_default();
    config.validate()?;

    if input.installment <= Decimal::ZERO {
        return Err(EmiError::invalid(
            "installment",
            "Installment must be positive",
        ));
    }

    // Validate rate and tenure with a placeholder principal; the principal
    // bound is checked once it is known.
    let placeholder = LoanTerms::new(Decimal::ONE, input.annual_rate_percent, input.tenure_months);
    placeholder.validate(&config.limits)?;

    let rate = placeholder.monthly_rate();
    let present_value = annuity::present_value(input.installment, rate, input.tenure_months)?;
    let principal = present_value
        .round_dp_with_strategy(config.decimal_places, RoundingStrategy::ToZero);

    if principal <= Decimal::ZERO {
        return Err(EmiError::out_of_range(
            "installment",
            format!(
                "Installment {} is below one minor currency unit of principal",
                input.installment
            ),
        ));
    }
    if principal > config.limits.max_principal {
        return Err(EmiError::out_of_range(
            "installment",
            format!(
                "Affordable principal {principal} exceeds maximum of {}",
                config.limits.max_principal
            ),
        ));
    }

    tracing::debug!(
        installment = %input.installment,
        max_principal = %principal,
        "computed affordable principal"
    );

    let terms = LoanTerms::new(principal, input.annual_rate_percent, input.tenure_months);
    let schedule = compute_schedule_with(&terms, &config)?;

    let output = AffordabilityOutput {
        max_principal: principal,
        emi: schedule.emi,
        total_interest: schedule.total_interest,
        total_amount: schedule.total_amount,
    };

    let assumptions = serde_json::json!({
        "monthly_rate": rate.to_string(),
        "rounding": config.rounding,
        "decimal_places": config.decimal_places,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Present value of a level monthly annuity: A·((1+r)^n − 1) / (r·(1+r)^n)",
        &assumptions,
        Vec::new(),
        elapsed,
        output,
    ))
}
