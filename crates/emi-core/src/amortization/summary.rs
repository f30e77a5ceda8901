use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::amortization::engine::ScheduleRow;
use crate::error::EmiError;
use crate::types::Money;
use crate::EmiResult;

/// Months folded into one row of the yearly view.
pub const YEARLY_GROUP: usize = 12;

const YEARLY_GROUP_SIZE: NonZeroUsize = match NonZeroUsize::new(YEARLY_GROUP) {
    Some(size) => size,
    None => panic!("YEARLY_GROUP must be non-zero"),
};

/// Schedules longer than this are shown year by year.
pub const DISPLAY_THRESHOLD: usize = 12;

/// Several consecutive schedule months folded into one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    /// 1-based group index (the year, for yearly groups).
    pub period: u32,
    /// Number of months in this group; the last group may be partial.
    pub months: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub total_paid: Money,
    /// Balance after the group's last month.
    pub balance: Money,
}

/// Fold `group_size` consecutive months into one row. A trailing partial
/// group is kept, so the sums over the summary equal the schedule totals.
pub fn summarize(schedule: &[ScheduleRow], group_size: usize) -> EmiResult<Vec<SummaryRow>> {
    let group_size = NonZeroUsize::new(group_size)
        .ok_or_else(|| EmiError::invalid("group_size", "Group size must be at least 1"))?;
    Ok(fold_rows(schedule, group_size))
}

/// The view shown next to the calculator: yearly rows once the schedule runs
/// past `threshold` months, otherwise one row per month.
pub fn display_rows(schedule: &[ScheduleRow], threshold: usize) -> Vec<SummaryRow> {
    let group_size = if schedule.len() > threshold {
        YEARLY_GROUP_SIZE
    } else {
        NonZeroUsize::MIN
    };
    fold_rows(schedule, group_size)
}

fn fold_rows(schedule: &[ScheduleRow], group_size: NonZeroUsize) -> Vec<SummaryRow> {
    schedule
        .chunks(group_size.get())
        .enumerate()
        .filter_map(|(idx, chunk)| {
            let last = chunk.last()?;
            let principal_paid: Money = chunk.iter().map(|r| r.principal_paid).sum();
            let interest_paid: Money = chunk.iter().map(|r| r.interest_paid).sum();
            Some(SummaryRow {
                period: idx as u32 + 1,
                months: chunk.len() as u32,
                principal_paid,
                interest_paid,
                total_paid: principal_paid + interest_paid,
                balance: last.balance,
            })
        })
        .collect()
}
