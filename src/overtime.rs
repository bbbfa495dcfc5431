//! Overtime calculator.
//!
//! Overtime for a day is the time worked before the scheduled start
//! plus the time worked after the scheduled end.  Each term is floored
//! at zero on its own, so arriving late never cancels staying late.
//!
//! [`overtime_report`] applies the calculation to the raw performance
//! logs of a date range: a day whose region has no schedule, or an
//! entry without both clock times, is left out rather than counted as
//! zero.  An employee gets at most one record per day: when the same
//! person appears in the logs of two regions on one date, the first
//! usable entry in log order is kept.

use crate::calendar::DateRange;
use crate::error::{EngineError, Result};
use crate::models::{utc_date, Employee, EmployeeId, PerformanceLog};
use crate::roster::Roster;
use crate::schedule::ScheduleBook;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// A time of day in whole seconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    /// `None` unless the components form a valid time of day.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(ClockTime(hour * 3600 + minute * 60 + second))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = EngineError;

    /// Accepts `HH:MM:SS` or `HH:MM`; missing seconds are zero.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidTime(s.to_string());
        let parts = s
            .trim()
            .split(':')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        match parts.as_slice() {
            [h, m] => ClockTime::from_hms(*h, *m, 0).ok_or_else(invalid),
            [h, m, sec] => ClockTime::from_hms(*h, *m, *sec).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ClockTime {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.0 / 3600, self.0 / 60 % 60, self.0 % 60)
    }
}

/// A start/end pair within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Scheduled start or clock-in.
    pub start: ClockTime,
    /// Scheduled end or clock-out.
    pub end: ClockTime,
}

impl TimeWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Parse both ends with [`ClockTime::from_str`].
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }
}

/// Seconds worked outside `scheduled`.  Never negative.
pub fn compute_overtime(scheduled: &TimeWindow, actual: &TimeWindow) -> i64 {
    let early = (i64::from(scheduled.start.seconds()) - i64::from(actual.start.seconds())).max(0);
    let late = (i64::from(actual.end.seconds()) - i64::from(scheduled.end.seconds())).max(0);
    early + late
}

/// Overtime of one employee on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeRecord {
    /// Employee the log entry resolved to.
    pub employee_id: EmployeeId,
    /// Roster name, not the name written in the log.
    pub employee_name: String,
    /// Region whose log and schedule produced the record.
    pub region: String,
    #[serde(with = "utc_date")]
    pub date: NaiveDate,
    /// Shift window from the region's schedule for the day.
    pub scheduled: TimeWindow,
    /// Clock-in and clock-out from the log.
    pub actual: TimeWindow,
    pub overtime_seconds: i64,
}

/// Overtime totals of one employee over the report range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeOvertime {
    pub employee_id: EmployeeId,
    pub name: String,
    /// Days that contributed a record.
    pub days: u32,
    /// Sum of the employee's record totals.
    pub overtime_seconds: i64,
}

/// Overtime over a date range: the per-day records, a line per roster
/// employee and the grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeReport {
    pub range: DateRange,
    /// Sorted by date, then employee id.
    pub records: Vec<OvertimeRecord>,
    /// One entry per roster employee, in roster order.
    pub employees: Vec<EmployeeOvertime>,
    /// Sum over all records.
    pub grand_total_seconds: i64,
}

impl OvertimeReport {
    /// Total for `employee_id`, zero when absent.
    pub fn total_for(&self, employee_id: EmployeeId) -> i64 {
        self.employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .map_or(0, |e| e.overtime_seconds)
    }

    /// Totals keyed by employee id, as the timesheet assembler takes them.
    pub fn totals_by_employee(&self) -> HashMap<EmployeeId, i64> {
        self.employees
            .iter()
            .map(|e| (e.employee_id, e.overtime_seconds))
            .collect()
    }
}

/// Compute overtime for every log entry in `range` that has both a
/// schedule and clock times, and total it per employee.
pub fn overtime_report(
    employees: &[Employee],
    logs: &[PerformanceLog],
    schedules: &ScheduleBook,
    range: DateRange,
) -> OvertimeReport {
    let roster = Roster::new(employees);
    let mut records = Vec::new();
    let mut recorded: HashSet<(EmployeeId, NaiveDate)> = HashSet::new();

    for log in logs.iter().filter(|log| range.contains(log.date)) {
        let Some(schedule) = schedules.get(&log.region, log.date) else {
            debug!(region = %log.region, date = %log.date, "no schedule for logged day, skipping");
            continue;
        };
        for entry in &log.entries {
            let Some(employee) = roster.resolve(entry) else {
                continue;
            };
            let (Some(start), Some(end)) = (entry.start_time.as_deref(), entry.end_time.as_deref()) else {
                debug!(user = %entry.user, date = %log.date, "entry has no clock times, skipping");
                continue;
            };
            let actual = match TimeWindow::parse(start, end) {
                Ok(actual) => actual,
                Err(err) => {
                    warn!(user = %entry.user, date = %log.date, error = %err, "unreadable clock time, skipping");
                    continue;
                }
            };
            if !recorded.insert((employee.id, log.date)) {
                warn!(
                    employee_id = employee.id,
                    date = %log.date,
                    region = %log.region,
                    "employee already has overtime for this day, skipping duplicate entry"
                );
                continue;
            }
            records.push(OvertimeRecord {
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                region: log.region.clone(),
                date: log.date,
                scheduled: schedule.window,
                actual,
                overtime_seconds: compute_overtime(&schedule.window, &actual),
            });
        }
    }
    records.sort_by_key(|r| (r.date, r.employee_id));

    // (days, seconds) per employee
    let mut per_employee: HashMap<EmployeeId, (u32, i64)> = HashMap::new();
    for record in &records {
        let slot = per_employee.entry(record.employee_id).or_default();
        slot.0 += 1;
        slot.1 += record.overtime_seconds;
    }
    let employees: Vec<EmployeeOvertime> = roster
        .employees()
        .iter()
        .map(|employee| {
            let (days, overtime_seconds) = per_employee.get(&employee.id).copied().unwrap_or_default();
            EmployeeOvertime {
                employee_id: employee.id,
                name: employee.name.clone(),
                days,
                overtime_seconds,
            }
        })
        .collect();
    let grand_total_seconds = records.iter().map(|r| r.overtime_seconds).sum();

    OvertimeReport {
        range,
        records,
        employees,
        grand_total_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerformanceEntry;
    use crate::schedule::{ScheduleAssignment, SchedulePreset};
    use std::collections::BTreeMap;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_clock_times() {
        assert_eq!(t("08:00").seconds(), 8 * 3600);
        assert_eq!(t("07:30:15").seconds(), 7 * 3600 + 30 * 60 + 15);
        assert_eq!(t(" 23:59:59 ").seconds(), 86_399);
        assert_eq!(t("18:45").to_string(), "18:45:00");
        for bad in ["", "8", "24:00", "12:60", "12:00:60", "ab:cd", "1:2:3:4", "-1:00"] {
            assert!(bad.parse::<ClockTime>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn early_start_and_late_finish() {
        assert_eq!(compute_overtime(&window("08:00", "18:00"), &window("07:30", "18:45")), 4500);
    }

    #[test]
    fn late_arrival_and_early_leave_give_no_overtime() {
        assert_eq!(compute_overtime(&window("08:00", "18:00"), &window("08:10", "17:50")), 0);
    }

    #[test]
    fn terms_do_not_offset_each_other() {
        // Late by an hour, stays an hour longer: one hour of overtime.
        assert_eq!(compute_overtime(&window("08:00", "17:00"), &window("09:00", "18:00")), 3600);
    }

    #[test]
    fn overtime_is_never_negative() {
        let samples = ["00:00", "06:15", "08:00", "12:30:30", "17:59:59", "23:59:59"];
        for ss in samples {
            for se in samples {
                for a in samples {
                    for b in samples {
                        assert!(compute_overtime(&window(ss, se), &window(a, b)) >= 0);
                    }
                }
            }
        }
    }

    fn employee(id: EmployeeId, name: &str) -> Employee {
        Employee {
            id,
            name: name.into(),
            national_id: None,
            hire_date: None,
            region: Some("Ankara".into()),
        }
    }

    fn entry(user: &str, start: Option<&str>, end: Option<&str>) -> PerformanceEntry {
        PerformanceEntry {
            user: user.into(),
            employee_id: None,
            total: 10,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            slots: BTreeMap::new(),
        }
    }

    fn book() -> ScheduleBook {
        let presets = vec![SchedulePreset {
            id: 1,
            name: "Gündüz".into(),
            start_time: t("08:00"),
            end_time: t("18:00"),
            break_minutes: 60,
        }];
        let assignments = vec![
            ScheduleAssignment {
                region: "Ankara".into(),
                date: date(2024, 1, 2),
                preset_id: 1,
            },
            ScheduleAssignment {
                region: "Ankara".into(),
                date: date(2024, 1, 3),
                preset_id: 1,
            },
        ];
        ScheduleBook::new(&presets, &assignments).unwrap()
    }

    #[test]
    fn report_totals_per_employee_and_overall() {
        let staff = vec![employee(1, "Ali Kaya"), employee(2, "Zeynep Demir"), employee(3, "Can Öz")];
        let logs = vec![
            PerformanceLog {
                region: "Ankara".into(),
                date: date(2024, 1, 2),
                entries: vec![
                    entry("Ali Kaya", Some("07:30"), Some("18:45")),
                    entry("Zeynep Demir", Some("08:10"), Some("17:50")),
                ],
            },
            PerformanceLog {
                region: "Ankara".into(),
                date: date(2024, 1, 3),
                entries: vec![
                    entry("Ali Kaya", Some("08:00"), Some("19:00")),
                    // No clock times: skipped.
                    entry("Zeynep Demir", None, Some("20:00")),
                    // Unreadable: skipped.
                    entry("Can Öz", Some("late"), Some("20:00")),
                ],
            },
            // No schedule for this day: skipped entirely.
            PerformanceLog {
                region: "Ankara".into(),
                date: date(2024, 1, 4),
                entries: vec![entry("Ali Kaya", Some("05:00"), Some("23:00"))],
            },
        ];
        let range = DateRange::month(2024, 1).unwrap();
        let report = overtime_report(&staff, &logs, &book(), range);

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.total_for(1), 4500 + 3600);
        assert_eq!(report.total_for(2), 0);
        assert_eq!(report.total_for(3), 0);
        assert_eq!(report.grand_total_seconds, 8100);
        assert_eq!(report.employees[0].days, 2);
        assert_eq!(report.employees[1].days, 1);
        assert_eq!(report.employees[2].days, 0);
        assert_eq!(report.totals_by_employee().get(&1), Some(&8100));
    }

    #[test]
    fn logs_outside_range_are_ignored() {
        let staff = vec![employee(1, "Ali Kaya")];
        let logs = vec![PerformanceLog {
            region: "Ankara".into(),
            date: date(2024, 1, 2),
            entries: vec![entry("Ali Kaya", Some("07:00"), Some("18:00"))],
        }];
        let range = DateRange::month(2024, 2).unwrap();
        let report = overtime_report(&staff, &logs, &book(), range);
        assert!(report.records.is_empty());
        assert_eq!(report.grand_total_seconds, 0);
    }

    #[test]
    fn shared_display_names_get_no_overtime() {
        let staff = vec![employee(1, "Ali Kaya"), employee(2, "Ali Kaya")];
        let mut tagged = entry("Ali Kaya", Some("07:00"), Some("18:00"));
        tagged.employee_id = Some(2);
        let logs = vec![PerformanceLog {
            region: "Ankara".into(),
            date: date(2024, 1, 2),
            entries: vec![entry("Ali Kaya", Some("07:00"), Some("18:00")), tagged],
        }];
        let report = overtime_report(&staff, &logs, &book(), DateRange::month(2024, 1).unwrap());
        assert_eq!(report.total_for(1), 0);
        assert_eq!(report.total_for(2), 3600);
    }

    #[test]
    fn one_record_per_employee_per_day() {
        let staff = vec![employee(1, "Ali Kaya")];
        let presets = vec![SchedulePreset {
            id: 1,
            name: "Gündüz".into(),
            start_time: t("08:00"),
            end_time: t("18:00"),
            break_minutes: 60,
        }];
        let assignments: Vec<ScheduleAssignment> = ["Ankara", "İzmir"]
            .into_iter()
            .map(|region| ScheduleAssignment {
                region: region.into(),
                date: date(2024, 1, 2),
                preset_id: 1,
            })
            .collect();
        let schedules = ScheduleBook::new(&presets, &assignments).unwrap();
        let logs = vec![
            PerformanceLog {
                region: "Ankara".into(),
                date: date(2024, 1, 2),
                // Unreadable, so the İzmir entry is the first usable one.
                entries: vec![entry("Ali Kaya", Some("early"), Some("18:00"))],
            },
            PerformanceLog {
                region: "İzmir".into(),
                date: date(2024, 1, 2),
                entries: vec![entry("Ali Kaya", Some("07:30"), Some("18:00"))],
            },
            PerformanceLog {
                region: "Ankara".into(),
                date: date(2024, 1, 2),
                entries: vec![entry("Ali Kaya", Some("07:00"), Some("19:00"))],
            },
        ];
        let report = overtime_report(&staff, &logs, &schedules, DateRange::month(2024, 1).unwrap());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].region, "İzmir");
        assert_eq!(report.total_for(1), 1800);
        assert_eq!(report.employees[0].days, 1);
        assert_eq!(report.grand_total_seconds, 1800);
    }
}
