//! Day classifier.
//!
//! Assigns exactly one [`DayStatus`] to each (employee, date) cell.
//! The precedence is a business rule: a weekend beats an official
//! holiday, which beats approved leave, which beats an ordinary working
//! day.  A leave that happens to span a Sunday therefore does not
//! consume leave balance for that Sunday.

use crate::calendar::{is_holiday, is_weekend, DateRange, HolidaySet};
use crate::leave::{LeaveKind, LeaveLookup};
use crate::models::{DayStatus, EmployeeId, WeekendPolicy};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Everything the classifier needs besides the cell coordinates.
pub struct DayContext<'a, L: LeaveLookup + ?Sized> {
    pub weekend_policy: WeekendPolicy,
    pub holidays: &'a HolidaySet,
    pub leaves: &'a L,
}

impl<'a, L: LeaveLookup + ?Sized> DayContext<'a, L> {
    pub fn new(weekend_policy: WeekendPolicy, holidays: &'a HolidaySet, leaves: &'a L) -> Self {
        Self {
            weekend_policy,
            holidays,
            leaves,
        }
    }
}

pub fn classify_day<L: LeaveLookup + ?Sized>(
    employee_id: EmployeeId,
    date: NaiveDate,
    ctx: &DayContext<'_, L>,
) -> DayStatus {
    if is_weekend(date, ctx.weekend_policy) {
        return DayStatus::Weekend;
    }
    if is_holiday(date, ctx.holidays) {
        return DayStatus::OfficialHoliday;
    }
    match ctx.leaves.leave_on(employee_id, date) {
        Some(LeaveKind::Known(leave_type)) => DayStatus::from(leave_type),
        Some(LeaveKind::Unrecognized(label)) => {
            debug!(employee_id, %date, label = %label, "unrecognized leave type, counting as worked");
            DayStatus::Worked
        }
        None => DayStatus::Worked,
    }
}

/// Classify every day of `range` for one employee.
pub fn classify_range<L: LeaveLookup + ?Sized>(
    employee_id: EmployeeId,
    range: DateRange,
    ctx: &DayContext<'_, L>,
) -> BTreeMap<NaiveDate, DayStatus> {
    range
        .days()
        .map(|date| (date, classify_day(employee_id, date, ctx)))
        .collect()
}
