//! Source data for the report service.
//!
//! [`TimesheetSource`] is the seam to whatever holds employees, leave
//! requests, holidays, schedules, performance logs and the manually
//! entered timesheet extras.  [`JsonDirSource`] reads them from a
//! directory of JSON files, one file per collection.

use crate::calendar::DateRange;
use crate::error::{EngineError, Result};
use crate::models::{Employee, Holiday, LeaveRequest, PerformanceLog, TimesheetExtras, WeekendPolicy};
use crate::schedule::{ScheduleAssignment, SchedulePreset};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Read access to the source tables plus the one write the engine
/// needs.  Range arguments are hints; implementations may return rows
/// outside the range and the engine filters again.
#[async_trait]
pub trait TimesheetSource: Send + Sync {
    async fn employees(&self) -> Result<Vec<Employee>>;
    async fn leave_requests(&self, range: DateRange) -> Result<Vec<LeaveRequest>>;
    async fn holidays(&self, range: DateRange) -> Result<Vec<Holiday>>;
    async fn schedule_presets(&self) -> Result<Vec<SchedulePreset>>;
    async fn schedule_assignments(&self, range: DateRange) -> Result<Vec<ScheduleAssignment>>;
    async fn performance_logs(&self, range: DateRange) -> Result<Vec<PerformanceLog>>;
    async fn timesheet_extras(&self, year: i32, month: u32) -> Result<Vec<TimesheetExtras>>;
    /// The administrator's current weekend policy, if one is stored.
    async fn weekend_policy(&self) -> Result<Option<WeekendPolicy>>;
    /// Insert or replace the extras for (employee, year, month).
    async fn save_extras(&self, extras: TimesheetExtras) -> Result<TimesheetExtras>;
}

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const LEAVE_REQUESTS_FILE: &str = "leave_requests.json";
pub const HOLIDAYS_FILE: &str = "holidays.json";
pub const SCHEDULE_PRESETS_FILE: &str = "schedule_presets.json";
pub const SCHEDULE_ASSIGNMENTS_FILE: &str = "schedule_assignments.json";
pub const PERFORMANCE_LOGS_FILE: &str = "performance_logs.json";
pub const TIMESHEET_EXTRAS_FILE: &str = "timesheet_extras.json";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Settings {
    #[serde(default)]
    weekend_policy: Option<WeekendPolicy>,
}

/// A directory of JSON files.
///
/// Every collection except `employees.json` is optional; a missing file
/// reads as empty.  Writes to `timesheet_extras.json` are serialised
/// through an internal lock and land through a rename, so a reader sees
/// either the old file or the new one.
pub struct JsonDirSource {
    /// Directory holding the collection files.
    root: PathBuf,
    /// Orders read-modify-write cycles against each other.
    write_lock: Mutex<()>,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: DeserializeOwned + Default>(&self, name: &str, required: bool) -> Result<T> {
        let path = self.root.join(name);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound && !required => {
                debug!(path = %path.display(), "source file missing, reading as empty");
                return Ok(T::default());
            }
            Err(source) => return Err(EngineError::Io { path, source }),
        };
        serde_json::from_str(&data).map_err(|source| EngineError::Json { path, source })
    }

    /// Replace `name` atomically.  Callers hold `write_lock`, so the
    /// staging file name is never shared between two writers.
    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.root.join(name);
        let data = serde_json::to_string_pretty(value).map_err(|source| EngineError::Json {
            path: path.clone(),
            source,
        })?;
        let staging = self.root.join(format!(".{name}.tmp"));
        if let Err(source) = tokio::fs::write(&staging, data).await {
            return Err(EngineError::Io { path: staging, source });
        }
        if let Err(source) = tokio::fs::rename(&staging, &path).await {
            // Leave no stale staging file behind; the original is intact.
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(EngineError::Io { path, source });
        }
        Ok(())
    }
}

#[async_trait]
impl TimesheetSource for JsonDirSource {
    async fn employees(&self) -> Result<Vec<Employee>> {
        self.read_json(EMPLOYEES_FILE, true).await
    }

    async fn leave_requests(&self, range: DateRange) -> Result<Vec<LeaveRequest>> {
        let all: Vec<LeaveRequest> = self.read_json(LEAVE_REQUESTS_FILE, false).await?;
        Ok(all
            .into_iter()
            .filter(|l| range.overlaps(l.start_date, l.end_date))
            .collect())
    }

    async fn holidays(&self, range: DateRange) -> Result<Vec<Holiday>> {
        let all: Vec<Holiday> = self.read_json(HOLIDAYS_FILE, false).await?;
        Ok(all.into_iter().filter(|h| range.contains(h.date)).collect())
    }

    async fn schedule_presets(&self) -> Result<Vec<SchedulePreset>> {
        self.read_json(SCHEDULE_PRESETS_FILE, false).await
    }

    async fn schedule_assignments(&self, range: DateRange) -> Result<Vec<ScheduleAssignment>> {
        let all: Vec<ScheduleAssignment> = self.read_json(SCHEDULE_ASSIGNMENTS_FILE, false).await?;
        Ok(all.into_iter().filter(|a| range.contains(a.date)).collect())
    }

    async fn performance_logs(&self, range: DateRange) -> Result<Vec<PerformanceLog>> {
        let all: Vec<PerformanceLog> = self.read_json(PERFORMANCE_LOGS_FILE, false).await?;
        Ok(all.into_iter().filter(|l| range.contains(l.date)).collect())
    }

    async fn timesheet_extras(&self, year: i32, month: u32) -> Result<Vec<TimesheetExtras>> {
        let all: Vec<TimesheetExtras> = self.read_json(TIMESHEET_EXTRAS_FILE, false).await?;
        Ok(all
            .into_iter()
            .filter(|e| e.year == year && e.month == month)
            .collect())
    }

    async fn weekend_policy(&self) -> Result<Option<WeekendPolicy>> {
        let settings: Settings = self.read_json(SETTINGS_FILE, false).await?;
        Ok(settings.weekend_policy)
    }

    async fn save_extras(&self, extras: TimesheetExtras) -> Result<TimesheetExtras> {
        let _guard = self.write_lock.lock().await;
        let mut all: Vec<TimesheetExtras> = self.read_json(TIMESHEET_EXTRAS_FILE, false).await?;
        let key = (extras.employee_id, extras.year, extras.month);
        match all.iter_mut().find(|e| (e.employee_id, e.year, e.month) == key) {
            Some(existing) => *existing = extras.clone(),
            None => all.push(extras.clone()),
        }
        self.write_json(TIMESHEET_EXTRAS_FILE, &all).await?;
        info!(
            employee_id = extras.employee_id,
            year = extras.year,
            month = extras.month,
            "saved timesheet extras"
        );
        Ok(extras)
    }
}
