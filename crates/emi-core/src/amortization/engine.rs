//! Reducing-balance EMI engine.
//!
//! Computes the equated monthly installment for a loan and the month-by-month
//! split of each payment into interest and principal until payoff. The engine
//! is a pure function of its inputs: no I/O, no shared state.

use rust_decimal::prelude::RoundingStrategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity;
use crate::config::{AmortizationLimits, EngineConfig, RoundingPolicy};
use crate::error::EmiError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::EmiResult;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Terms of a fixed-rate loan as entered by the borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual interest rate as a percentage (8.5 = 8.5% p.a.).
    #[serde(rename = "annualRate")]
    pub annual_rate_percent: Percent,
    /// Number of monthly installments.
    pub tenure_months: u32,
}

/// A request to the engine: loan terms plus optional per-request configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<EngineConfig>,
}

/// One month of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    /// 1-based month number.
    pub month: u32,
    pub emi: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    /// Outstanding principal after this month's payment.
    pub balance: Money,
}

impl ScheduleRow {
    /// Amount actually paid this month. Equals `emi` on every row except
    /// possibly the last, which clears the remaining balance.
    pub fn payment(&self) -> Money {
        self.principal_paid + self.interest_paid
    }
}

/// Installment, totals and the full monthly schedule for a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    pub emi: Money,
    pub principal: Money,
    pub total_interest: Money,
    /// principal + total_interest
    pub total_amount: Money,
    pub schedule: Vec<ScheduleRow>,
}

impl AmortizationResult {
    pub fn final_row(&self) -> Option<&ScheduleRow> {
        self.schedule.last()
    }
}

// ---------------------------------------------------------------------------
// LoanTerms
// ---------------------------------------------------------------------------

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_percent: Percent, tenure_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            tenure_months,
        }
    }

    /// Build terms from a tenure expressed in whole years.
    pub fn from_years(
        principal: Money,
        annual_rate_percent: Percent,
        tenure_years: u32,
    ) -> EmiResult<Self> {
        if tenure_years == 0 {
            return Err(EmiError::invalid(
                "tenure_years",
                "Tenure must be at least 1 year",
            ));
        }
        let tenure_months = tenure_years
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or_else(|| EmiError::out_of_range("tenure_years", "Tenure is too long"))?;
        Ok(Self::new(principal, annual_rate_percent, tenure_months))
    }

    /// Reject non-positive terms first, then terms beyond the configured limits.
    pub fn validate(&self, limits: &AmortizationLimits) -> EmiResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(EmiError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(EmiError::invalid(
                "annual_rate_percent",
                "Annual rate cannot be negative",
            ));
        }
        if self.tenure_months == 0 {
            return Err(EmiError::invalid(
                "tenure_months",
                "Tenure must be at least 1 month",
            ));
        }
        if self.principal > limits.max_principal {
            return Err(EmiError::out_of_range(
                "principal",
                format!("Principal exceeds maximum of {}", limits.max_principal),
            ));
        }
        if self.annual_rate_percent > limits.max_annual_rate_percent {
            return Err(EmiError::out_of_range(
                "annual_rate_percent",
                format!(
                    "Annual rate exceeds maximum of {}%",
                    limits.max_annual_rate_percent
                ),
            ));
        }
        if self.tenure_months > limits.max_tenure_months {
            return Err(EmiError::out_of_range(
                "tenure_months",
                format!(
                    "Tenure exceeds maximum of {} months",
                    limits.max_tenure_months
                ),
            ));
        }
        Ok(())
    }

    pub fn monthly_rate(&self) -> Rate {
        annuity::monthly_rate(self.annual_rate_percent)
    }
}

impl EmiInput {
    /// Parse a JSON request. Malformed or non-numeric fields are `InvalidInput`.
    pub fn from_json(json: &str) -> EmiResult<Self> {
        serde_json::from_str(json).map_err(|e| EmiError::invalid("request", e.to_string()))
    }

    pub fn effective_config(&self) -> EngineConfig {
        self.config.clone().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the installment and full schedule under the default configuration.
pub fn compute_schedule(terms: &LoanTerms) -> EmiResult<AmortizationResult> {
    compute_schedule_with(terms, &EngineConfig::default())
}

/// Compute the installment and full schedule under an explicit configuration.
pub fn compute_schedule_with(
    terms: &LoanTerms,
    config: &EngineConfig,
) -> EmiResult<AmortizationResult> {
    amortize(terms, config).map(|amortized| amortized.result)
}

/// Compute a schedule and wrap it in the standard output envelope.
pub fn calculate_emi(input: &EmiInput) -> EmiResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let config = input.effective_config();
    let terms = &input.terms;

    let Amortized {
        result,
        rounding_fallback,
    } = amortize(terms, &config)?;

    let mut warnings: Vec<String> = Vec::new();
    if terms.annual_rate_percent.is_zero() {
        warnings.push("Zero-interest loan: every installment is principal only".into());
    }
    if rounding_fallback {
        warnings.push(format!(
            "Installment rounded to {} decimal places cannot amortize this loan; \
             full precision carried instead",
            config.decimal_places
        ));
    }
    if let Some(last) = result.final_row() {
        let adjustment = last.payment() - result.emi;
        if !adjustment.is_zero() {
            warnings.push(format!(
                "Final installment adjusted by {} to clear the outstanding balance",
                adjustment.normalize()
            ));
        }
    }
    for w in &warnings {
        tracing::debug!(warning = %w, "amortization warning");
    }

    let assumptions = serde_json::json!({
        "monthly_rate": terms.monthly_rate().to_string(),
        "rounding": config.rounding,
        "decimal_places": config.decimal_places,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance EMI: P·r·(1+r)^n / ((1+r)^n − 1), monthly compounding",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// A computed schedule plus whether the rounded installment had to be
/// abandoned for full precision.
struct Amortized {
    result: AmortizationResult,
    rounding_fallback: bool,
}

fn amortize(terms: &LoanTerms, config: &EngineConfig) -> EmiResult<Amortized> {
    config.validate()?;
    terms.validate(&config.limits)?;

    tracing::debug!(
        principal = %terms.principal,
        annual_rate_percent = %terms.annual_rate_percent,
        tenure_months = terms.tenure_months,
        rounding = ?config.rounding,
        "computing amortization schedule"
    );

    let rate = terms.monthly_rate();
    let exact_emi = annuity::installment(terms.principal, rate, terms.tenure_months)?;

    // A zero-rate installment is the exact quotient under every policy.
    let rounded = match config.rounding {
        RoundingPolicy::RoundedInstallment if !rate.is_zero() => {
            let emi = round_money(exact_emi, config.decimal_places);
            Some(build_schedule(terms, rate, emi, Some(config.decimal_places)).map(|s| (emi, s)))
        }
        _ => None,
    };

    let rounding_fallback = matches!(rounded, Some(None));
    let (emi, schedule) = match rounded.flatten() {
        Some(rounded) => rounded,
        None => {
            if rounding_fallback {
                tracing::debug!(
                    decimal_places = config.decimal_places,
                    "rounded installment cannot amortize, carrying full precision"
                );
            }
            let schedule = build_schedule(terms, rate, exact_emi, None).ok_or_else(|| {
                EmiError::out_of_range(
                    "principal",
                    format!("Installment {exact_emi} cannot amortize the loan"),
                )
            })?;
            (exact_emi, schedule)
        }
    };

    let total_interest: Money = schedule.iter().map(|r| r.interest_paid).sum();
    let total_amount = terms.principal + total_interest;

    Ok(Amortized {
        result: AmortizationResult {
            emi,
            principal: terms.principal,
            total_interest,
            total_amount,
            schedule,
        },
        rounding_fallback,
    })
}

fn round_money(value: Money, decimal_places: u32) -> Money {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Walk the loan month by month. When `minor_unit_dp` is set every interest
/// amount is rounded to the minor unit, so each row is exact in that unit.
/// The final row always pays off the remaining balance.
///
/// Returns `None` when `emi` does not amortize the loan: some month's
/// installment fails to cover its interest, or the balance is exhausted
/// before the final month.
fn build_schedule(
    terms: &LoanTerms,
    rate: Rate,
    emi: Money,
    minor_unit_dp: Option<u32>,
) -> Option<Vec<ScheduleRow>> {
    let n = terms.tenure_months;
    let mut schedule: Vec<ScheduleRow> = Vec::with_capacity(n as usize);
    let mut balance = terms.principal;

    for month in 1..=n {
        let mut interest_paid = balance * rate;
        if let Some(dp) = minor_unit_dp {
            interest_paid = round_money(interest_paid, dp);
        }

        let principal_paid = if month == n {
            balance
        } else {
            let principal_paid = emi - interest_paid;
            if principal_paid <= Decimal::ZERO || principal_paid >= balance {
                return None;
            }
            principal_paid
        };

        balance -= principal_paid;

        schedule.push(ScheduleRow {
            month,
            emi,
            principal_paid,
            interest_paid,
            balance,
        });
    }

    Some(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn unrounded() -> EngineConfig {
        EngineConfig {
            rounding: RoundingPolicy::Unrounded,
            ..EngineConfig::default()
        }
    }

    fn whole_units() -> EngineConfig {
        EngineConfig {
            decimal_places: 0,
            ..EngineConfig::default()
        }
    }

    // -----------------------------------------------------------------------
    // 1. Home loan scenario: 50 lakh at 8.5% over 20 years
    // -----------------------------------------------------------------------
    #[test]
    fn test_home_loan_emi_whole_units() {
        let terms = LoanTerms::new(dec!(5_000_000), dec!(8.5), 240);
        let result = compute_schedule_with(&terms, &whole_units()).unwrap();

        assert_eq!(result.emi, dec!(43391));
        assert_eq!(result.schedule.len(), 240);
        assert_eq!(result.final_row().unwrap().balance, Decimal::ZERO);
        assert_eq!(result.emi * dec!(240), dec!(10_413_840));
        // The rounded-down EMI leaves ~83 of drift for the final installment.
        assert!(
            (result.total_amount - dec!(10_413_840)).abs() < dec!(150),
            "total amount {} should be close to 10,413,840",
            result.total_amount
        );
    }

    // -----------------------------------------------------------------------
    // 2. One-year loan fully amortizes
    // -----------------------------------------------------------------------
    #[test]
    fn test_one_year_loan_pays_off() {
        let terms = LoanTerms::new(dec!(100_000), dec!(10), 12);
        let result = compute_schedule(&terms).unwrap();

        assert_eq!(result.schedule.len(), 12);
        let last = result.final_row().unwrap();
        assert_eq!(last.month, 12);
        assert_eq!(last.balance, Decimal::ZERO);
        // EMI ≈ 8,791.59
        assert_eq!(result.emi, dec!(8791.59));
    }

    // -----------------------------------------------------------------------
    // 3. Rounded policy: every row is exact in the minor unit
    // -----------------------------------------------------------------------
    #[test]
    fn test_rounded_policy_rows_exact() {
        let terms = LoanTerms::new(dec!(2_500_000), dec!(9.25), 180);
        let result = compute_schedule(&terms).unwrap();

        let n = result.schedule.len();
        for row in &result.schedule[..n - 1] {
            assert_eq!(row.emi, result.emi);
            assert_eq!(row.payment(), result.emi, "month {}", row.month);
            assert_eq!(row.interest_paid, row.interest_paid.round_dp(2));
        }
        let principal_sum: Money = result.schedule.iter().map(|r| r.principal_paid).sum();
        assert_eq!(principal_sum, dec!(2_500_000));
    }

    // -----------------------------------------------------------------------
    // 4. Unrounded policy: EMI carried at full precision
    // -----------------------------------------------------------------------
    #[test]
    fn test_unrounded_policy_keeps_precision() {
        let terms = LoanTerms::new(dec!(100_000), dec!(10), 12);
        let result = compute_schedule_with(&terms, &unrounded()).unwrap();

        assert_ne!(result.emi, result.emi.round_dp(2));
        assert!((result.emi - dec!(8791.59)).abs() < dec!(0.01));

        let n = result.schedule.len();
        for row in &result.schedule[..n - 1] {
            assert!((row.payment() - result.emi).abs() < dec!(0.0000000001));
        }
        let last = result.final_row().unwrap();
        assert_eq!(last.balance, Decimal::ZERO);
        assert!((last.payment() - result.emi).abs() < dec!(0.000001));
    }

    // -----------------------------------------------------------------------
    // 5. Zero-interest loan
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_rate_principal_only() {
        let terms = LoanTerms::new(dec!(120_000), dec!(0), 24);
        let result = compute_schedule_with(&terms, &unrounded()).unwrap();

        assert_eq!(result.emi, dec!(120_000) / dec!(24));
        assert_eq!(result.total_interest, Decimal::ZERO);
        assert_eq!(result.total_amount, dec!(120_000));
        for row in &result.schedule {
            assert_eq!(row.interest_paid, Decimal::ZERO);
            assert_eq!(row.principal_paid, dec!(5000));
        }
    }

    #[test]
    fn test_zero_rate_emi_exact_under_default_policy() {
        let terms = LoanTerms::new(dec!(100_000), dec!(0), 7);
        for cfg in [EngineConfig::default(), whole_units()] {
            let result = compute_schedule_with(&terms, &cfg).unwrap();

            assert_eq!(result.emi, dec!(100_000) / dec!(7));
            assert_eq!(result.schedule.len(), 7);
            assert!(result.schedule.iter().all(|r| r.interest_paid.is_zero()));
            assert_eq!(result.final_row().unwrap().balance, Decimal::ZERO);
            let principal_sum: Money = result.schedule.iter().map(|r| r.principal_paid).sum();
            assert!((principal_sum - dec!(100_000)).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn test_one_unit_over_fifty_years_interest_free() {
        // Rounded to paise this installment would be 0.00.
        let terms = LoanTerms::new(dec!(1), dec!(0), 600);
        let result = compute_schedule(&terms).unwrap();

        assert_eq!(result.emi, dec!(1) / dec!(600));
        assert_eq!(result.schedule.len(), 600);
        assert_eq!(result.final_row().unwrap().balance, Decimal::ZERO);
        assert_eq!(result.total_amount, dec!(1));
    }

    // -----------------------------------------------------------------------
    // 6. Balance strictly decreases to zero
    // -----------------------------------------------------------------------
    #[test]
    fn test_balance_strictly_decreasing() {
        let terms = LoanTerms::new(dec!(750_000), dec!(11.5), 60);
        let result = compute_schedule(&terms).unwrap();

        let mut previous = terms.principal;
        for row in &result.schedule {
            assert!(
                row.balance < previous,
                "month {}: balance {} should be below {}",
                row.month,
                row.balance,
                previous
            );
            previous = row.balance;
        }
    }

    // -----------------------------------------------------------------------
    // 7. Totals identity
    // -----------------------------------------------------------------------
    #[test]
    fn test_total_amount_identity() {
        let terms = LoanTerms::new(dec!(333_333), dec!(7.77), 97);
        for cfg in [EngineConfig::default(), unrounded(), whole_units()] {
            let result = compute_schedule_with(&terms, &cfg).unwrap();
            assert_eq!(result.total_amount, result.principal + result.total_interest);
        }
    }

    // -----------------------------------------------------------------------
    // 8. Single-month loan
    // -----------------------------------------------------------------------
    #[test]
    fn test_single_month_loan() {
        let terms = LoanTerms::new(dec!(10_000), dec!(12), 1);
        let result = compute_schedule(&terms).unwrap();
        assert_eq!(result.schedule.len(), 1);
        assert_eq!(result.emi, dec!(10_100));
        assert_eq!(result.schedule[0].interest_paid, dec!(100));
        assert_eq!(result.schedule[0].principal_paid, dec!(10_000));
        assert_eq!(result.schedule[0].balance, Decimal::ZERO);
    }

    // -----------------------------------------------------------------------
    // 9. Validation
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_principal_invalid() {
        let terms = LoanTerms::new(dec!(0), dec!(8.5), 240);
        let err = compute_schedule(&terms).unwrap_err();
        assert!(matches!(err, EmiError::InvalidInput { ref field, .. } if field == "principal"));
    }

    #[test]
    fn test_negative_rate_invalid() {
        let terms = LoanTerms::new(dec!(1000), dec!(-1), 12);
        let err = compute_schedule(&terms).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_zero_tenure_invalid() {
        let terms = LoanTerms::new(dec!(1000), dec!(5), 0);
        let err = compute_schedule(&terms).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_bounds_out_of_range() {
        let cases = [
            LoanTerms::new(dec!(1000), dec!(100.01), 12),
            LoanTerms::new(dec!(1000), dec!(8), 601),
            LoanTerms::new(dec!(2_000_000_000_000), dec!(8), 12),
        ];
        for terms in &cases {
            let err = compute_schedule(terms).unwrap_err();
            assert_eq!(err.kind(), "OutOfRange", "{terms:?}");
        }
    }

    #[test]
    fn test_invalid_checked_before_range() {
        // Negative principal and absurd tenure: the sign problem wins.
        let terms = LoanTerms::new(dec!(-5), dec!(8), 10_000);
        assert_eq!(compute_schedule(&terms).unwrap_err().kind(), "InvalidInput");
    }

    #[test]
    fn test_coarse_unit_falls_back_to_full_precision() {
        // EMI ≈ 0.84 rounds to 1 while month-one interest also rounds to 1.
        let terms = LoanTerms::new(dec!(100), dec!(10), 600);
        let rounded = compute_schedule_with(&terms, &whole_units()).unwrap();
        let exact = compute_schedule_with(&terms, &unrounded()).unwrap();

        assert_eq!(rounded.schedule.len(), 600);
        assert_eq!(rounded.emi, exact.emi);
        assert_eq!(rounded.final_row().unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_small_loan_amortizes_under_default_config() {
        // 0.08 covers neither the first month's interest nor the loan at 2 dp.
        let terms = LoanTerms::new(dec!(10), dec!(10), 600);
        let result = compute_schedule(&terms).unwrap();

        assert_eq!(result.schedule.len(), 600);
        assert_eq!(result.final_row().unwrap().balance, Decimal::ZERO);
        assert_eq!(result.total_amount, result.principal + result.total_interest);
        let mut previous = terms.principal;
        for row in &result.schedule {
            assert!(row.balance < previous, "month {}", row.month);
            previous = row.balance;
        }

        let out = calculate_emi(&EmiInput {
            terms,
            config: None,
        })
        .unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("full precision carried instead")));
    }

    // -----------------------------------------------------------------------
    // 10. Tenure in years
    // -----------------------------------------------------------------------
    #[test]
    fn test_from_years() {
        let terms = LoanTerms::from_years(dec!(1_000_000), dec!(9), 15).unwrap();
        assert_eq!(terms.tenure_months, 180);
        assert!(LoanTerms::from_years(dec!(1_000_000), dec!(9), 0).is_err());
    }

    // -----------------------------------------------------------------------
    // 11. Envelope and wire format
    // -----------------------------------------------------------------------
    #[test]
    fn test_calculate_emi_envelope() {
        let input = EmiInput::from_json(
            r#"{"principal": 5000000, "annualRate": 8.5, "tenureMonths": 240, "config": {"decimal_places": 0}}"#,
        )
        .unwrap();
        let out = calculate_emi(&input).unwrap();

        assert_eq!(out.result.emi, dec!(43391));
        assert!(out.methodology.contains("Reducing-balance"));
        assert_eq!(out.assumptions["decimal_places"], 0);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("Final installment adjusted")));
    }

    #[test]
    fn test_zero_rate_warning() {
        let input = EmiInput {
            terms: LoanTerms::new(dec!(1200), dec!(0), 12),
            config: None,
        };
        let out = calculate_emi(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Zero-interest")));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let terms = LoanTerms::new(dec!(1000), dec!(12), 2);
        let result = compute_schedule(&terms).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("totalInterest").is_some());
        assert!(json.get("totalAmount").is_some());
        let row = &json["schedule"][0];
        assert_eq!(row["month"], 1);
        assert!(row.get("principalPaid").is_some());
        assert!(row.get("interestPaid").is_some());
    }

    #[test]
    fn test_amounts_cross_the_wire_as_strings() {
        let terms = LoanTerms::new(dec!(100_000), dec!(10), 12);
        let result = compute_schedule(&terms).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["emi"], "8791.59");
        for key in ["principal", "totalInterest", "totalAmount"] {
            assert!(json[key].is_string(), "{key} should be a string");
        }
        let row = &json["schedule"][0];
        for key in ["emi", "principalPaid", "interestPaid", "balance"] {
            assert!(row[key].is_string(), "row {key} should be a string");
        }
        assert!(row["month"].is_u64());

        // Requests may carry either form.
        let from_numbers =
            EmiInput::from_json(r#"{"principal": 100000, "annualRate": 10, "tenureMonths": 12}"#)
                .unwrap();
        let from_strings = EmiInput::from_json(
            r#"{"principal": "100000", "annualRate": "10", "tenureMonths": 12}"#,
        )
        .unwrap();
        assert_eq!(from_numbers.terms, from_strings.terms);
    }

    #[test]
    fn test_malformed_request_is_invalid_input() {
        let err = EmiInput::from_json(r#"{"principal": "abc", "annualRate": 8, "tenureMonths": 12}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }
}
