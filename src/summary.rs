//! Monthly summary reducer.
//!
//! Folds per-day statuses into the counters shown at the end of each
//! timesheet row, then merges the manually entered extras and the
//! overtime total.

use crate::models::{DayStatus, MonthlySummary, TimesheetExtras};

/// Incremental tally of day statuses.
#[derive(Debug, Clone, Default)]
pub struct SummaryReducer {
    summary: MonthlySummary,
}

impl SummaryReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, status: DayStatus) {
        let s = &mut self.summary;
        match status {
            DayStatus::Worked => s.worked_days += 1,
            DayStatus::Weekend => s.weekend_days += 1,
            DayStatus::OfficialHoliday => s.holiday_days += 1,
            DayStatus::AnnualLeave => s.annual_leave_days += 1,
            DayStatus::PaidLeave => s.paid_leave_days += 1,
            DayStatus::UnpaidLeave => s.unpaid_leave_days += 1,
            DayStatus::MedicalLeave => s.medical_leave_days += 1,
        }
        if status.counts_as_work_day() {
            s.actual_days += 1;
        }
        // Unpaid leave is in neither term.
        s.total_days = s.actual_days + s.weekend_days + s.holiday_days;
    }

    pub fn finish(self) -> MonthlySummary {
        self.summary
    }
}

impl Extend<DayStatus> for SummaryReducer {
    fn extend<I: IntoIterator<Item = DayStatus>>(&mut self, iter: I) {
        for status in iter {
            self.push(status);
        }
    }
}

/// Tally a period's statuses in one pass.
pub fn summarize<'a, I>(statuses: I) -> MonthlySummary
where
    I: IntoIterator<Item = &'a DayStatus>,
{
    let mut reducer = SummaryReducer::new();
    reducer.extend(statuses.into_iter().copied());
    reducer.finish()
}

impl MonthlySummary {
    /// Copy the manual fields from `extras`.  A missing record leaves
    /// them empty.
    pub fn with_extras(mut self, extras: Option<&TimesheetExtras>) -> Self {
        self.missing_days = extras.and_then(|e| e.missing_days);
        self.additional_pay = extras.and_then(|e| e.additional_pay);
        self.notes = extras.and_then(|e| e.notes.clone());
        self
    }

    pub fn with_overtime(mut self, overtime_seconds: i64) -> Self {
        self.overtime_seconds = overtime_seconds;
        self
    }
}
