//! Calendar policy.
//!
//! Pure predicates for weekends and official holidays plus the
//! inclusive [`DateRange`] the rest of the engine iterates over.  All
//! dates are timezone-free calendar dates; values arriving as
//! timestamps are reduced to their UTC date when they are deserialised
//! (see [`crate::models::utc_date`]).

use crate::error::{EngineError, Result};
use crate::models::{utc_date, Holiday, WeekendPolicy};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Returns true if `date` is a non-working weekday under `policy`.
pub fn is_weekend(date: NaiveDate, policy: WeekendPolicy) -> bool {
    match policy {
        WeekendPolicy::SundayOnly => date.weekday() == Weekday::Sun,
        WeekendPolicy::SaturdayAndSunday => matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
    }
}

pub fn is_holiday(date: NaiveDate, holidays: &HolidaySet) -> bool {
    holidays.contains(date)
}

/// Set of official holidays keyed by date.
#[derive(Debug, Clone, Default)]
pub struct HolidaySet {
    dates: HashMap<NaiveDate, String>,
}

impl HolidaySet {
    pub fn new(holidays: &[Holiday]) -> Self {
        holidays.iter().cloned().collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains_key(&date)
    }

    pub fn name(&self, date: NaiveDate) -> Option<&str> {
        self.dates.get(&date).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<Holiday> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = Holiday>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().map(|h| (h.date, h.name)).collect(),
        }
    }
}

/// Number of days in the given month, or `None` if the month is out of
/// range.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

/// An inclusive range of calendar dates.  `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    #[serde(with = "utc_date")]
    start: NaiveDate,
    #[serde(with = "utc_date")]
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    #[serde(with = "utc_date")]
    start: NaiveDate,
    #[serde(with = "utc_date")]
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = EngineError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(EngineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month `year-month`.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let invalid = || EngineError::InvalidMonth { year, month };
        let days = days_in_month(year, month).ok_or_else(invalid)?;
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = NaiveDate::from_ymd_opt(year, month, days).ok_or_else(invalid)?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True if the inclusive interval `[start, end]` shares at least one
    /// day with this range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }

    pub fn num_days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(u32::MAX)
    }

    /// Iterate every date in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}
