//! Timesheet assembly engine.
//!
//! The `engine` module turns a [`TimesheetInput`] into one
//! [`TimesheetRow`] per employee.  It uses the [`rayon`] crate to
//! classify employees in parallel; every step is a pure function of the
//! input, so the output is identical from one run to the next and rows
//! come back in roster order.

use crate::calendar::HolidaySet;
use crate::classifier::{classify_range, DayContext};
use crate::leave::LeaveIndex;
use crate::models::{EmployeeId, TimesheetExtras, TimesheetInput, TimesheetRow};
use crate::summary::summarize;
use chrono::Datelike;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Builds the timesheet rows for `input.range`.
///
/// Manual extras are looked up by the employee and the year/month in
/// which the range starts; overtime by employee id.  Missing entries
/// leave the manual fields empty and the overtime at zero.
pub fn build_timesheet(input: &TimesheetInput) -> Vec<TimesheetRow> {
    let holidays = HolidaySet::new(&input.holidays);
    let leaves = LeaveIndex::new(&input.leaves);
    let ctx = DayContext::new(input.weekend_policy, &holidays, &leaves);

    let period = (input.range.start().year(), input.range.start().month());
    let extras: HashMap<EmployeeId, &TimesheetExtras> = input
        .extras
        .iter()
        .filter(|e| (e.year, e.month) == period)
        .map(|e| (e.employee_id, e))
        .collect();

    debug!(
        employees = input.employees.len(),
        days = input.range.num_days(),
        holidays = holidays.len(),
        leave_overlaps = leaves.overlaps().len(),
        "assembling timesheet"
    );

    input
        .employees
        .par_iter()
        .map(|employee| {
            let days = classify_range(employee.id, input.range, &ctx);
            let overtime = input.overtime_seconds.get(&employee.id).copied().unwrap_or(0);
            let summary = summarize(days.values())
                .with_extras(extras.get(&employee.id).copied())
                .with_overtime(overtime);
            TimesheetRow {
                employee_id: employee.id,
                name: employee.name.clone(),
                national_id: employee.national_id.clone(),
                days,
                summary,
            }
        })
        .collect()
}
