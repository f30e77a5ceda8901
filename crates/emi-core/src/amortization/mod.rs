//! Loan amortization: installment calculation, month-by-month schedules and
//! the aggregated views shown alongside them.

pub mod engine;
pub mod summary;

#[cfg(feature = "affordability")]
pub mod affordability;
