//! Technical schedule.
//!
//! Shift presets define working hours; assignments place a preset on a
//! region's calendar for a given day.  [`ScheduleBook`] resolves the
//! schedule that applies to a (region, date) pair.

use crate::error::{EngineError, Result};
use crate::models::utc_date;
use crate::overtime::{ClockTime, TimeWindow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named shift with fixed working hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePreset {
    pub id: i64,
    /// Display name, e.g. "Gündüz".
    pub name: String,
    /// Scheduled start, `HH:MM[:SS]`.
    pub start_time: ClockTime,
    /// Scheduled end, `HH:MM[:SS]`.
    pub end_time: ClockTime,
    /// Informational; not part of the overtime formula.
    #[serde(default)]
    pub break_minutes: u32,
}

/// Places a preset on a region's calendar for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    /// Region name as written in the performance logs.
    pub region: String,
    #[serde(with = "utc_date")]
    pub date: NaiveDate,
    pub preset_id: i64,
}

/// The schedule in force for one region on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub preset_id: i64,
    pub window: TimeWindow,
    pub break_minutes: u32,
}

/// Resolved schedules keyed by (region, date).
#[derive(Debug, Clone, Default)]
pub struct ScheduleBook {
    by_day: HashMap<(String, NaiveDate), Schedule>,
}

impl ScheduleBook {
    /// Resolve every assignment against `presets`.  A later assignment
    /// for the same region and day replaces an earlier one.
    pub fn new(presets: &[SchedulePreset], assignments: &[ScheduleAssignment]) -> Result<Self> {
        let presets: HashMap<i64, &SchedulePreset> = presets.iter().map(|p| (p.id, p)).collect();
        let mut by_day = HashMap::new();
        for assignment in assignments {
            let preset = presets
                .get(&assignment.preset_id)
                .ok_or_else(|| EngineError::UnknownPreset {
                    region: assignment.region.clone(),
                    date: assignment.date,
                    preset_id: assignment.preset_id,
                })?;
            by_day.insert(
                (assignment.region.clone(), assignment.date),
                Schedule {
                    preset_id: preset.id,
                    window: TimeWindow::new(preset.start_time, preset.end_time),
                    break_minutes: preset.break_minutes,
                },
            );
        }
        Ok(Self { by_day })
    }

    /// The schedule for `region` on `date`, if one was assigned.
    pub fn get(&self, region: &str, date: NaiveDate) -> Option<&Schedule> {
        self.by_day.get(&(region.to_string(), date))
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}
