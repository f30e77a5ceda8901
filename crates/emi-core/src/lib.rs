pub mod amortization;
pub mod annuity;
pub mod config;
pub mod error;
pub mod types;

pub use amortization::engine::{
    calculate_emi, compute_schedule, compute_schedule_with, AmortizationResult, EmiInput,
    LoanTerms, ScheduleRow,
};
pub use amortization::summary::{display_rows, summarize, SummaryRow};
pub use config::{AmortizationLimits, EngineConfig, RoundingPolicy};
pub use error::{EmiError, ErrorResponse};
pub use types::*;

#[cfg(feature = "affordability")]
pub use amortization::affordability::{max_principal, AffordabilityInput, AffordabilityOutput};

/// Standard result type for all EMI operations
pub type EmiResult<T> = Result<T, EmiError>;
