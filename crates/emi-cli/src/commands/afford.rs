use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use emi_core::{max_principal, AffordabilityInput, EngineConfig};

use crate::commands::tenure_from_flags;
use crate::input;

/// Arguments for loan affordability
#[derive(Args)]
pub struct AffordArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly installment the borrower can pay
    #[arg(long, alias = "emi")]
    pub installment: Option<Decimal>,

    /// Annual interest rate in percent (8.5 = 8.5%)
    #[arg(long, alias = "annual-rate")]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long, conflicts_with = "tenure_years")]
    pub tenure_months: Option<u32>,

    /// Tenure in years
    #[arg(long)]
    pub tenure_years: Option<u32>,
}

pub fn run_afford(
    args: AffordArgs,
    engine_config: Option<EngineConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut afford_input: AffordabilityInput = match input::read_request(args.input.as_deref())? {
        Some(data) => input::parse_request(data)?,
        None => AffordabilityInput {
            installment: args
                .installment
                .ok_or("--installment is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            tenure_months: tenure_from_flags(args.tenure_months, args.tenure_years)?,
            config: None,
        },
    };
    if afford_input.config.is_none() {
        afford_input.config = engine_config;
    }

    let result = max_principal(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}
