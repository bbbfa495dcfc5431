//! Data models for the timesheet engine.
//!
//! The `models` module defines the serialisable records the engine
//! consumes (employees, leave requests, holidays, performance logs,
//! manually entered extras) and the structures it produces (day
//! statuses, monthly summaries and timesheet rows).  Records read from
//! the data source keep their loosely typed string fields on the wire;
//! typed views such as [`LeaveType`] are derived from them on demand so
//! an unexpected value never fails a whole report.

use crate::calendar::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Stable numeric identifier of an employee.
pub type EmployeeId = i64;

/// An employee as stored in the personnel records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    /// Full display name.  Not unique.
    pub name: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Branch or region the employee is attached to.
    #[serde(default)]
    pub region: Option<String>,
}

/// Category of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Worked,
    AnnualLeave,
    PaidLeave,
    UnpaidLeave,
    MedicalLeave,
}

impl LeaveType {
    /// Parse a stored leave type label.
    ///
    /// The label is trimmed and lower-cased, and `-` or spaces are read
    /// as `_`, so `"Annual-Leave "` and `"annual_leave"` are the same
    /// type.  Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "worked" => Some(LeaveType::Worked),
            "annual_leave" => Some(LeaveType::AnnualLeave),
            "paid_leave" => Some(LeaveType::PaidLeave),
            "unpaid_leave" => Some(LeaveType::UnpaidLeave),
            "medical_leave" => Some(LeaveType::MedicalLeave),
            _ => None,
        }
    }
}

/// A leave request row.  `start_date` and `end_date` are both
/// inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub employee_id: EmployeeId,
    #[serde(with = "utc_date")]
    pub start_date: NaiveDate,
    #[serde(with = "utc_date")]
    pub end_date: NaiveDate,
    /// Raw leave type label.  A missing, null or non-string value reads
    /// as empty and classifies as an unrecognised type.
    #[serde(default, deserialize_with = "lenient_label")]
    pub leave_type: String,
    pub status: String,
}

impl LeaveRequest {
    /// Only approved requests take part in day classification.
    pub fn is_approved(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("approved")
    }

    pub fn kind(&self) -> Option<LeaveType> {
        LeaveType::parse(&self.leave_type)
    }
}

fn lenient_label<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_owned).unwrap_or_default())
}

/// An official (public) holiday.  Applies to every employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(with = "utc_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub name: String,
}

/// Which weekdays are non-working by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendPolicy {
    SundayOnly,
    #[default]
    SaturdayAndSunday,
}

impl std::str::FromStr for WeekendPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunday_only" => Ok(WeekendPolicy::SundayOnly),
            "saturday_and_sunday" => Ok(WeekendPolicy::SaturdayAndSunday),
            other => Err(format!("unknown weekend policy: {other}")),
        }
    }
}

/// The status assigned to a single (employee, date) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Worked,
    Weekend,
    OfficialHoliday,
    AnnualLeave,
    PaidLeave,
    UnpaidLeave,
    MedicalLeave,
}

impl DayStatus {
    /// Whether a day with this status counts towards the actual worked
    /// days ("fiili gün") of the month.  Paid absences count, unpaid
    /// leave does not, and neither do weekends or official holidays.
    pub fn counts_as_work_day(self) -> bool {
        matches!(
            self,
            DayStatus::Worked | DayStatus::AnnualLeave | DayStatus::PaidLeave | DayStatus::MedicalLeave
        )
    }
}

impl From<LeaveType> for DayStatus {
    fn from(leave: LeaveType) -> Self {
        match leave {
            LeaveType::Worked => DayStatus::Worked,
            LeaveType::AnnualLeave => DayStatus::AnnualLeave,
            LeaveType::PaidLeave => DayStatus::PaidLeave,
            LeaveType::UnpaidLeave => DayStatus::UnpaidLeave,
            LeaveType::MedicalLeave => DayStatus::MedicalLeave,
        }
    }
}

/// Manually entered, persisted additions to a monthly timesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetExtras {
    pub employee_id: EmployeeId,
    pub year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
    /// Days the employee was absent without record.  May be fractional.
    #[serde(default)]
    pub missing_days: Option<f64>,
    /// Extra pay agreed for the month.
    #[serde(default)]
    pub additional_pay: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Per employee counters for a period.
///
/// `actual_days` is the "fiili gün" figure and `total_days` the
/// "toplam gün" figure; `total_days == actual_days + weekend_days +
/// holiday_days` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub worked_days: u32,
    pub annual_leave_days: u32,
    pub paid_leave_days: u32,
    pub unpaid_leave_days: u32,
    pub medical_leave_days: u32,
    pub weekend_days: u32,
    pub holiday_days: u32,
    pub actual_days: u32,
    pub total_days: u32,
    pub overtime_seconds: i64,
    pub missing_days: Option<f64>,
    pub additional_pay: Option<f64>,
    pub notes: Option<String>,
}

/// One row of the timesheet grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetRow {
    pub employee_id: EmployeeId,
    pub name: String,
    pub national_id: Option<String>,
    /// Status of every day in the requested range.
    pub days: BTreeMap<NaiveDate, DayStatus>,
    pub summary: MonthlySummary,
}

/// Input to the timesheet assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesheetInput {
    pub employees: Vec<Employee>,
    pub range: DateRange,
    #[serde(default)]
    pub leaves: Vec<LeaveRequest>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub weekend_policy: WeekendPolicy,
    /// Precomputed overtime per employee over the same range.
    #[serde(default)]
    pub overtime_seconds: HashMap<EmployeeId, i64>,
    #[serde(default)]
    pub extras: Vec<TimesheetExtras>,
}

/// A full monthly timesheet as returned by the report service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetReport {
    pub year: i32,
    pub month: u32,
    pub weekend_policy: WeekendPolicy,
    pub rows: Vec<TimesheetRow>,
    pub overtime_grand_total_seconds: i64,
}

/// Raw performance log of one region for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceLog {
    pub region: String,
    #[serde(with = "utc_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub entries: Vec<PerformanceEntry>,
}

/// One user's line in a performance log.
///
/// Besides the named fields an entry carries one numeric field per time
/// slot (e.g. `"08:00-10:00": 14`); those land in `slots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub user: String,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "startTime", alias = "start_time")]
    pub start_time: Option<String>,
    #[serde(default, rename = "endTime", alias = "end_time")]
    pub end_time: Option<String>,
    #[serde(flatten)]
    pub slots: BTreeMap<String, serde_json::Value>,
}

impl PerformanceEntry {
    /// Activity counts per time slot.  Non-numeric extra fields are
    /// ignored.
    pub fn slot_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.slots
            .iter()
            .filter_map(|(slot, value)| value.as_u64().map(|count| (slot.as_str(), count)))
    }
}

/// Serde helpers for calendar dates that may arrive either as plain
/// `YYYY-MM-DD` strings or as timestamps.  Timestamps are converted to
/// UTC before the date is taken so that midnight values never shift to
/// the neighbouring day.
pub mod utc_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
        // Timestamps without an offset are taken to be UTC already.
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|ts| ts.date())
    }
}
