use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use emi_core::amortization::summary::{self, DISPLAY_THRESHOLD, YEARLY_GROUP};
use emi_core::{calculate_emi, AmortizationResult, EmiInput, EngineConfig, LoanTerms};

use crate::commands::tenure_from_flags;
use crate::input;

/// How the schedule is laid out in the output
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ScheduleView {
    /// One row per month
    #[default]
    Monthly,
    /// One row per year
    Yearly,
    /// Yearly once the loan runs past a year, monthly otherwise
    Auto,
}

/// Arguments for EMI and schedule calculation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (8.5 = 8.5%)
    #[arg(long, alias = "annual-rate")]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long, conflicts_with = "tenure_years")]
    pub tenure_months: Option<u32>,

    /// Tenure in years
    #[arg(long)]
    pub tenure_years: Option<u32>,

    /// Schedule layout
    #[arg(long, value_enum, default_value = "monthly")]
    pub view: ScheduleView,
}

/// Arguments for summarising an existing schedule
#[derive(Args)]
pub struct SummarizeArgs {
    /// Path to JSON file holding a schedule result (or pipe it on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Months per summary row
    #[arg(long, default_value_t = YEARLY_GROUP)]
    pub group_size: usize,
}

pub fn run_schedule(
    args: ScheduleArgs,
    engine_config: Option<EngineConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut emi_input: EmiInput = match input::read_request(args.input.as_deref())? {
        Some(data) => input::parse_request(data)?,
        None => EmiInput {
            terms: LoanTerms::new(
                args.principal
                    .ok_or("--principal is required (or provide --input)")?,
                args.rate.ok_or("--rate is required (or provide --input)")?,
                tenure_from_flags(args.tenure_months, args.tenure_years)?,
            ),
            config: None,
        },
    };
    if emi_input.config.is_none() {
        emi_input.config = engine_config;
    }

    schedule_value(&emi_input, args.view)
}

fn schedule_value(
    emi_input: &EmiInput,
    view: ScheduleView,
) -> Result<Value, Box<dyn std::error::Error>> {
    let output = calculate_emi(emi_input)?;
    let mut value = serde_json::to_value(&output)?;
    apply_view(&mut value, &output.result, view)?;
    Ok(value)
}

pub fn run_summarize(args: SummarizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data = input::read_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for summarize")?;

    // Accept either a bare result or the envelope printed by `emi schedule`.
    let data = match data {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    };
    let result: AmortizationResult = input::parse_request(data)?;
    let rows = summary::summarize(&result.schedule, args.group_size)?;

    Ok(json!({
        "result": {
            "groupSize": args.group_size,
            "totalInterest": result.total_interest,
            "totalAmount": result.total_amount,
            "summary": rows,
        }
    }))
}

/// Replace the monthly schedule in the output with the requested summary.
fn apply_view(
    value: &mut Value,
    result: &AmortizationResult,
    view: ScheduleView,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = match view {
        ScheduleView::Monthly => return Ok(()),
        ScheduleView::Yearly => summary::summarize(&result.schedule, YEARLY_GROUP)?,
        ScheduleView::Auto => summary::display_rows(&result.schedule, DISPLAY_THRESHOLD),
    };

    if let Some(Value::Object(map)) = value.get_mut("result") {
        map.remove("schedule");
        map.insert("summary".into(), serde_json::to_value(rows)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(months: u32, config: Option<EngineConfig>) -> EmiInput {
        EmiInput {
            terms: LoanTerms::new(dec!(5_000_000), dec!(8.5), months),
            config,
        }
    }

    #[test]
    fn test_yearly_view_replaces_schedule() {
        let value = schedule_value(&request(240, None), ScheduleView::Yearly).unwrap();
        let result = &value["result"];
        assert!(result.get("schedule").is_none());
        assert_eq!(result["summary"].as_array().unwrap().len(), 20);
    }

    #[test]
    fn test_monthly_view_keeps_schedule() {
        let value = schedule_value(&request(24, None), ScheduleView::Monthly).unwrap();
        assert_eq!(value["result"]["schedule"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_auto_view_short_loan_is_monthly() {
        let value = schedule_value(&request(6, None), ScheduleView::Auto).unwrap();
        let rows = value["result"]["summary"].as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["months"], 1);
    }

    #[test]
    fn test_whole_unit_config() {
        let cfg = EngineConfig {
            decimal_places: 0,
            ..EngineConfig::default()
        };
        let value = schedule_value(&request(240, Some(cfg)), ScheduleView::Monthly).unwrap();
        assert_eq!(value["result"]["emi"], "43391");
    }

    #[test]
    fn test_engine_error_propagates() {
        let err = schedule_value(&request(0, None), ScheduleView::Monthly).unwrap_err();
        let emi_err = err.downcast_ref::<emi_core::EmiError>().unwrap();
        assert_eq!(emi_err.kind(), "InvalidInput");
    }
}
