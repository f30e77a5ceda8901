//! Engine configuration: input bounds and the installment rounding policy.
//!
//! Every field has a default so partial configuration files deserialize.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EmiError;
use crate::types::{Money, Percent};
use crate::EmiResult;

/// Upper bound on `decimal_places`; finer units gain nothing over the
/// 28-digit decimal mantissa for realistic loan sizes.
pub const MAX_DECIMAL_PLACES: u32 = 6;

/// How the installment is rounded and carried through the schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingPolicy {
    /// Round the EMI once to the currency's minor unit and keep every row
    /// exact in that unit. The final row absorbs the accumulated drift.
    #[default]
    RoundedInstallment,
    /// Carry full decimal precision through the schedule. The final row
    /// clamps the sub-unit residual.
    Unrounded,
}

/// Sane bounds on loan terms; inputs beyond them are `OutOfRange`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmortizationLimits {
    pub max_principal: Money,
    pub max_annual_rate_percent: Percent,
    pub max_tenure_months: u32,
}

impl Default for AmortizationLimits {
    fn default() -> Self {
        Self {
            max_principal: dec!(1_000_000_000_000),
            max_annual_rate_percent: dec!(100),
            max_tenure_months: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: AmortizationLimits,
    pub rounding: RoundingPolicy,
    /// Minor currency unit as decimal places (2 = paise/cents, 0 = whole units).
    pub decimal_places: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: AmortizationLimits::default(),
            rounding: RoundingPolicy::default(),
            decimal_places: 2,
        }
    }
}

impl EngineConfig {
    /// Check the configuration itself before any terms are validated against it.
    pub fn validate(&self) -> EmiResult<()> {
        if self.limits.max_principal <= Decimal::ZERO {
            return Err(EmiError::invalid(
                "limits.max_principal",
                "Maximum principal must be positive",
            ));
        }
        if self.limits.max_annual_rate_percent <= Decimal::ZERO {
            return Err(EmiError::invalid(
                "limits.max_annual_rate_percent",
                "Maximum annual rate must be positive",
            ));
        }
        if self.limits.max_tenure_months == 0 {
            return Err(EmiError::invalid(
                "limits.max_tenure_months",
                "Maximum tenure must be at least 1 month",
            ));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(EmiError::invalid(
                "decimal_places",
                format!("Decimal places must be at most {MAX_DECIMAL_PLACES}"),
            ));
        }
        Ok(())
    }

    /// Smallest representable currency amount, e.g. 0.01 for two places.
    pub fn minor_unit(&self) -> Decimal {
        Decimal::new(1, self.decimal_places)
    }
}
