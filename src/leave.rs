//! Leave interval index.
//!
//! Answers "which leave, if any, covers employee E on date D?" over the
//! approved leave requests.  Requests are kept per employee in the order
//! they were supplied and the first covering interval wins.  Upstream
//! data is expected not to contain overlapping approved intervals for
//! one employee; when it does, the overlaps are logged and exposed via
//! [`LeaveIndex::overlaps`] so callers can surface them.

use crate::models::{EmployeeId, LeaveRequest, LeaveType};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::warn;

/// The leave found for a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveKind {
    Known(LeaveType),
    /// The stored type label did not match any known leave type.
    Unrecognized(String),
}

/// Lookup of approved leave by employee and date.
///
/// Implementations must be thread-safe because rows are assembled in
/// parallel.
pub trait LeaveLookup: Send + Sync {
    fn leave_on(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<LeaveKind>;
}

#[derive(Debug, Clone)]
struct Interval {
    start: NaiveDate,
    end: NaiveDate,
    kind: LeaveKind,
}

impl Interval {
    fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Two approved intervals of the same employee that share at least one
/// day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOverlap {
    pub employee_id: EmployeeId,
    pub first: (NaiveDate, NaiveDate),
    pub second: (NaiveDate, NaiveDate),
}

/// Approved leave intervals grouped per employee, in source order.
#[derive(Debug, Clone, Default)]
pub struct LeaveIndex {
    by_employee: HashMap<EmployeeId, Vec<Interval>>,
    overlaps: Vec<LeaveOverlap>,
}

impl LeaveIndex {
    /// Build the index from all leave requests.  Requests that are not
    /// approved are dropped, as are requests ending before they start.
    pub fn new(requests: &[LeaveRequest]) -> Self {
        let mut by_employee: HashMap<EmployeeId, Vec<Interval>> = HashMap::new();
        for request in requests.iter().filter(|r| r.is_approved()) {
            if request.start_date > request.end_date {
                warn!(
                    employee_id = request.employee_id,
                    start = %request.start_date,
                    end = %request.end_date,
                    "ignoring leave request that ends before it starts"
                );
                continue;
            }
            let kind = match request.kind() {
                Some(leave_type) => LeaveKind::Known(leave_type),
                None => LeaveKind::Unrecognized(request.leave_type.clone()),
            };
            by_employee.entry(request.employee_id).or_default().push(Interval {
                start: request.start_date,
                end: request.end_date,
                kind,
            });
        }

        let mut overlaps = Vec::new();
        for (employee_id, intervals) in &by_employee {
            for (i, a) in intervals.iter().enumerate() {
                for b in &intervals[i + 1..] {
                    if a.start <= b.end && b.start <= a.end {
                        warn!(
                            employee_id,
                            first = %format!("{}..{}", a.start, a.end),
                            second = %format!("{}..{}", b.start, b.end),
                            "overlapping approved leave; the earlier request wins"
                        );
                        overlaps.push(LeaveOverlap {
                            employee_id: *employee_id,
                            first: (a.start, a.end),
                            second: (b.start, b.end),
                        });
                    }
                }
            }
        }
        overlaps.sort_by_key(|o| (o.employee_id, o.first, o.second));

        Self { by_employee, overlaps }
    }

    /// The leave covering `employee_id` on `date`.  When intervals
    /// overlap, the one supplied first wins.
    pub fn classify(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<LeaveKind> {
        self.by_employee
            .get(&employee_id)?
            .iter()
            .find(|interval| interval.covers(date))
            .map(|interval| interval.kind.clone())
    }

    pub fn overlaps(&self) -> &[LeaveOverlap] {
        &self.overlaps
    }
}

impl LeaveLookup for LeaveIndex {
    fn leave_on(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<LeaveKind> {
        self.classify(employee_id, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leave(employee_id: EmployeeId, start: NaiveDate, end: NaiveDate, kind: &str, status: &str) -> LeaveRequest {
        LeaveRequest {
            id: None,
            employee_id,
            start_date: start,
            end_date: end,
            leave_type: kind.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn covers_inclusive_bounds() {
        let index = LeaveIndex::new(&[leave(1, date(2024, 1, 2), date(2024, 1, 4), "paid_leave", "approved")]);
        assert_eq!(index.classify(1, date(2024, 1, 1)), None);
        assert_eq!(index.classify(1, date(2024, 1, 2)), Some(LeaveKind::Known(LeaveType::PaidLeave)));
        assert_eq!(index.classify(1, date(2024, 1, 4)), Some(LeaveKind::Known(LeaveType::PaidLeave)));
        assert_eq!(index.classify(1, date(2024, 1, 5)), None);
    }

    #[test]
    fn ignores_other_employees_and_unapproved_requests() {
        let index = LeaveIndex::new(&[
            leave(2, date(2024, 1, 1), date(2024, 1, 31), "annual_leave", "approved"),
            leave(1, date(2024, 1, 1), date(2024, 1, 31), "annual_leave", "pending"),
            leave(1, date(2024, 1, 1), date(2024, 1, 31), "annual_leave", "rejected"),
        ]);
        assert_eq!(index.classify(1, date(2024, 1, 10)), None);
        assert!(index.classify(2, date(2024, 1, 10)).is_some());
    }

    #[test]
    fn unrecognized_type_is_reported_as_such() {
        let index = LeaveIndex::new(&[leave(1, date(2024, 1, 1), date(2024, 1, 1), "Sabbatical", "approved")]);
        assert_eq!(
            index.classify(1, date(2024, 1, 1)),
            Some(LeaveKind::Unrecognized("Sabbatical".into()))
        );
    }

    #[test]
    fn first_overlapping_interval_wins_and_is_flagged() {
        let index = LeaveIndex::new(&[
            leave(1, date(2024, 1, 1), date(2024, 1, 5), "medical_leave", "approved"),
            leave(1, date(2024, 1, 4), date(2024, 1, 8), "annual_leave", "approved"),
        ]);
        assert_eq!(index.classify(1, date(2024, 1, 4)), Some(LeaveKind::Known(LeaveType::MedicalLeave)));
        assert_eq!(index.classify(1, date(2024, 1, 6)), Some(LeaveKind::Known(LeaveType::AnnualLeave)));
        assert_eq!(
            index.overlaps(),
            &[LeaveOverlap {
                employee_id: 1,
                first: (date(2024, 1, 1), date(2024, 1, 5)),
                second: (date(2024, 1, 4), date(2024, 1, 8)),
            }]
        );

        // Same intervals, reversed order: the other one wins.
        let reversed = LeaveIndex::new(&[
            leave(1, date(2024, 1, 4), date(2024, 1, 8), "annual_leave", "approved"),
            leave(1, date(2024, 1, 1), date(2024, 1, 5), "medical_leave", "approved"),
        ]);
        assert_eq!(reversed.classify(1, date(2024, 1, 4)), Some(LeaveKind::Known(LeaveType::AnnualLeave)));
    }

    #[test]
    fn adjacent_intervals_do_not_overlap() {
        let index = LeaveIndex::new(&[
            leave(1, date(2024, 1, 1), date(2024, 1, 3), "annual_leave", "approved"),
            leave(1, date(2024, 1, 4), date(2024, 1, 6), "unpaid_leave", "approved"),
        ]);
        assert!(index.overlaps().is_empty());
        assert_eq!(index.classify(1, date(2024, 1, 4)), Some(LeaveKind::Known(LeaveType::UnpaidLeave)));
    }

    #[test]
    fn reversed_request_is_ignored() {
        let index = LeaveIndex::new(&[leave(1, date(2024, 1, 5), date(2024, 1, 1), "annual_leave", "approved")]);
        assert_eq!(index.classify(1, date(2024, 1, 3)), None);
    }
}
