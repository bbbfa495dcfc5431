//! Employee roster lookups.
//!
//! Performance log entries identify their user by display name and,
//! in newer logs, by employee id.  The roster resolves an entry to an
//! employee, preferring the id and refusing names that more than one
//! employee shares.

use crate::models::{Employee, EmployeeId, PerformanceEntry};
use std::collections::HashMap;
use tracing::{debug, warn};

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Id and display-name indexes over a borrowed employee list.
pub struct Roster<'a> {
    employees: &'a [Employee],
    by_id: HashMap<EmployeeId, usize>,
    by_name: HashMap<String, Vec<usize>>,
}

impl<'a> Roster<'a> {
    pub fn new(employees: &'a [Employee]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, employee) in employees.iter().enumerate() {
            by_id.insert(employee.id, pos);
            by_name.entry(normalize_name(&employee.name)).or_default().push(pos);
        }
        Self {
            employees,
            by_id,
            by_name,
        }
    }

    /// All employees, in source order.
    pub fn employees(&self) -> &'a [Employee] {
        self.employees
    }

    pub fn get(&self, id: EmployeeId) -> Option<&'a Employee> {
        self.by_id.get(&id).map(|&pos| &self.employees[pos])
    }

    /// Resolve a display name.  Returns `None` when no employee, or more
    /// than one, carries the name.
    pub fn by_name(&self, name: &str) -> Option<&'a Employee> {
        match self.by_name.get(&normalize_name(name)).map(Vec::as_slice) {
            Some([pos]) => Some(&self.employees[*pos]),
            Some(many) if many.len() > 1 => {
                warn!(name, matches = many.len(), "display name is shared by several employees");
                None
            }
            _ => None,
        }
    }

    /// The employee a log entry belongs to.  An entry carrying an id is
    /// matched on the id only.
    pub fn resolve(&self, entry: &PerformanceEntry) -> Option<&'a Employee> {
        let found = match entry.employee_id {
            Some(id) => self.get(id),
            None => self.by_name(&entry.user),
        };
        if found.is_none() {
            debug!(user = %entry.user, employee_id = ?entry.employee_id, "log entry matches no employee");
        }
        found
    }
}
