//! Report service.
//!
//! Fetches the source collections a report needs concurrently, then
//! runs the synchronous engine over them.  Any fetch failure aborts the
//! whole report; no partial results are returned.

use crate::calendar::DateRange;
use crate::engine::build_timesheet;
use crate::error::{EngineError, Result};
use crate::models::{TimesheetExtras, TimesheetInput, TimesheetReport, WeekendPolicy};
use crate::overtime::{overtime_report, OvertimeReport};
use crate::performance::{performance_report, PerformanceReport};
use crate::schedule::ScheduleBook;
use crate::store::TimesheetSource;
use std::sync::Arc;
use tracing::{error, info};

/// Builds reports from a [`TimesheetSource`].
pub struct ReportService {
    /// Shared with the HTTP state; any source implementation fits.
    source: Arc<dyn TimesheetSource>,
    /// Weekend policy used when neither the request nor the source
    /// names one.
    default_policy: WeekendPolicy,
}

impl ReportService {
    pub fn new(source: Arc<dyn TimesheetSource>, default_policy: WeekendPolicy) -> Self {
        Self {
            source,
            default_policy,
        }
    }

    /// The monthly timesheet grid.  `policy_override` pins the weekend
    /// policy; otherwise the stored setting is used, falling back to the
    /// configured default.
    pub async fn monthly_timesheet(
        &self,
        year: i32,
        month: u32,
        policy_override: Option<WeekendPolicy>,
    ) -> Result<TimesheetReport> {
        let range = DateRange::month(year, month)?;
        let src = &self.source;
        let (employees, leaves, holidays, presets, assignments, logs, extras, stored_policy) = tokio::try_join!(
            src.employees(),
            src.leave_requests(range),
            src.holidays(range),
            src.schedule_presets(),
            src.schedule_assignments(range),
            src.performance_logs(range),
            src.timesheet_extras(year, month),
            src.weekend_policy(),
        )
        .map_err(log_failure)?;

        // Overtime first; the rows only take the per-employee totals.
        let schedules = ScheduleBook::new(&presets, &assignments).map_err(log_failure)?;
        let overtime = overtime_report(&employees, &logs, &schedules, range);
        let weekend_policy = policy_override.or(stored_policy).unwrap_or(self.default_policy);

        let input = TimesheetInput {
            employees,
            range,
            leaves,
            holidays,
            weekend_policy,
            overtime_seconds: overtime.totals_by_employee(),
            extras,
        };
        let rows = build_timesheet(&input);
        info!(year, month, ?weekend_policy, rows = rows.len(), "built monthly timesheet");

        Ok(TimesheetReport {
            year,
            month,
            weekend_policy,
            rows,
            overtime_grand_total_seconds: overtime.grand_total_seconds,
        })
    }

    /// Overtime per day and per employee over `range`.
    pub async fn overtime_report(&self, range: DateRange) -> Result<OvertimeReport> {
        let src = &self.source;
        let (employees, presets, assignments, logs) = tokio::try_join!(
            src.employees(),
            src.schedule_presets(),
            src.schedule_assignments(range),
            src.performance_logs(range),
        )
        .map_err(log_failure)?;
        let schedules = ScheduleBook::new(&presets, &assignments).map_err(log_failure)?;
        let report = overtime_report(&employees, &logs, &schedules, range);
        info!(
            start = %range.start(),
            end = %range.end(),
            records = report.records.len(),
            grand_total_seconds = report.grand_total_seconds,
            "built overtime report"
        );
        Ok(report)
    }

    /// Performance log totals over `range`, with overtime attached.
    pub async fn performance_report(&self, range: DateRange) -> Result<PerformanceReport> {
        let src = &self.source;
        let (employees, presets, assignments, logs) = tokio::try_join!(
            src.employees(),
            src.schedule_presets(),
            src.schedule_assignments(range),
            src.performance_logs(range),
        )
        .map_err(log_failure)?;
        let schedules = ScheduleBook::new(&presets, &assignments).map_err(log_failure)?;
        let overtime = overtime_report(&employees, &logs, &schedules, range);
        Ok(performance_report(&employees, &logs, &overtime, range))
    }

    /// Validate and persist the manual extras of one employee-month.
    pub async fn save_extras(&self, extras: TimesheetExtras) -> Result<TimesheetExtras> {
        if !(1..=12).contains(&extras.month) {
            return Err(EngineError::InvalidMonth {
                year: extras.year,
                month: extras.month,
            });
        }
        if extras.missing_days.is_some_and(|d| d < 0.0 || !d.is_finite()) {
            return Err(EngineError::Validation("missing_days must be a non-negative number".into()));
        }
        self.source.save_extras(extras).await.map_err(log_failure)
    }
}

fn log_failure(err: EngineError) -> EngineError {
    error!(error = %err, "report aborted");
    err
}
