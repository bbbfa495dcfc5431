//! Performance log report.
//!
//! Aggregates the per-slot activity counts of the raw performance logs
//! over a date range, per employee, and attaches the overtime computed
//! for the same range.

use crate::calendar::DateRange;
use crate::models::{Employee, EmployeeId, PerformanceLog};
use crate::overtime::OvertimeReport;
use crate::roster::Roster;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Activity of one roster employee over the report range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePerformance {
    pub employee_id: EmployeeId,
    /// Roster name.
    pub name: String,
    /// Distinct dates with at least one log entry.
    pub logged_days: u32,
    /// Sum of the entries' `total` field.
    pub total_activity: u64,
    /// Summed counts per slot label, ordered by label.
    pub slots: BTreeMap<String, u64>,
    /// Overtime for the same range.
    pub overtime_seconds: i64,
}

/// Performance over a date range, one line per roster employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub range: DateRange,
    /// In roster order; employees without entries have zero counts.
    pub employees: Vec<EmployeePerformance>,
    pub total_activity: u64,
    pub overtime_grand_total_seconds: i64,
}

#[derive(Default)]
struct Tally {
    dates: BTreeSet<NaiveDate>,
    total: u64,
    slots: BTreeMap<String, u64>,
}

/// Aggregate `logs` in `range` per employee.  Entries that resolve to no
/// employee are dropped.
pub fn performance_report(
    employees: &[Employee],
    logs: &[PerformanceLog],
    overtime: &OvertimeReport,
    range: DateRange,
) -> PerformanceReport {
    let roster = Roster::new(employees);
    let mut tallies: HashMap<EmployeeId, Tally> = HashMap::new();

    for log in logs.iter().filter(|log| range.contains(log.date)) {
        for entry in &log.entries {
            let Some(employee) = roster.resolve(entry) else {
                continue;
            };
            let tally = tallies.entry(employee.id).or_default();
            tally.dates.insert(log.date);
            tally.total += entry.total;
            for (slot, count) in entry.slot_counts() {
                *tally.slots.entry(slot.to_string()).or_default() += count;
            }
        }
    }

    // Roster order, zero-filled.
    let employees: Vec<EmployeePerformance> = roster
        .employees()
        .iter()
        .map(|employee| {
            let tally = tallies.remove(&employee.id).unwrap_or_default();
            EmployeePerformance {
                employee_id: employee.id,
                name: employee.name.clone(),
                logged_days: u32::try_from(tally.dates.len()).unwrap_or(u32::MAX),
                total_activity: tally.total,
                slots: tally.slots,
                overtime_seconds: overtime.total_for(employee.id),
            }
        })
        .collect();

    PerformanceReport {
        range,
        total_activity: employees.iter().map(|e| e.total_activity).sum(),
        overtime_grand_total_seconds: overtime.grand_total_seconds,
        employees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overtime::overtime_report;
    use crate::schedule::ScheduleBook;
    use serde_json::json;

    #[test]
    fn sums_slots_and_totals_per_employee() {
        let staff: Vec<Employee> = serde_json::from_value(json!([
            {"id": 1, "name": "Ali Kaya"},
            {"id": 2, "name": "Zeynep Demir"}
        ]))
        .unwrap();
        let logs: Vec<PerformanceLog> = serde_json::from_value(json!([
            {"region": "Ankara", "date": "2024-01-02", "entries": [
                {"user": "Ali Kaya", "08-10": 3, "10-12": 5, "total": 8},
                {"user": "Bilinmeyen", "08-10": 9, "total": 9}
            ]},
            {"region": "Konya", "date": "2024-01-02", "entries": [
                {"user": "Ali Kaya", "08-10": 1, "total": 1}
            ]},
            {"region": "Ankara", "date": "2024-01-03", "entries": [
                {"user": "Ali Kaya", "10-12": 2, "total": 2}
            ]},
            {"region": "Ankara", "date": "2024-02-01", "entries": [
                {"user": "Ali Kaya", "10-12": 100, "total": 100}
            ]}
        ]))
        .unwrap();
        let range = DateRange::month(2024, 1).unwrap();
        let overtime = overtime_report(&staff, &logs, &ScheduleBook::default(), range);
        let report = performance_report(&staff, &logs, &overtime, range);

        let ali = &report.employees[0];
        assert_eq!(ali.logged_days, 2);
        assert_eq!(ali.total_activity, 11);
        assert_eq!(ali.slots.get("08-10"), Some(&4));
        assert_eq!(ali.slots.get("10-12"), Some(&7));
        assert_eq!(ali.overtime_seconds, 0);

        let zeynep = &report.employees[1];
        assert_eq!(zeynep.logged_days, 0);
        assert!(zeynep.slots.is_empty());

        assert_eq!(report.total_activity, 11);
        assert_eq!(report.overtime_grand_total_seconds, 0);
    }
}
