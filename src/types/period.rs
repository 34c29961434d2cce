//! Calendar types used to select and group climate data.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Format used by the climate service for `start`/`end` and for its per-day keys.
pub(crate) const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// A calendar month of a specific year; the grouping key of the aggregates.
///
/// Ordering is chronological (year first, then month).
///
/// # Examples
///
/// ```
/// use municlima::Month;
///
/// let key = Month::new(3, 2024);
/// assert_eq!(key.year(), 2024);
/// assert_eq!(key.month(), 3);
/// assert_eq!(key.to_string(), "2024-03");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(pub i32, pub u32);

impl Month {
    pub fn year(self) -> i32 {
        self.0
    }
    pub fn month(self) -> u32 {
        self.1
    }
    pub fn new(month: u32, year: i32) -> Self {
        Self(year, month)
    }

    /// The key a daily sample falls into.
    pub fn of(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, returning `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every day of the range in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// `start` as the compact `YYYYMMDD` string the climate service expects.
    pub fn compact_start(&self) -> String {
        self.start.format(COMPACT_DATE_FORMAT).to_string()
    }

    /// `end` as the compact `YYYYMMDD` string the climate service expects.
    pub fn compact_end(&self) -> String {
        self.end.format(COMPACT_DATE_FORMAT).to_string()
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateSelectionError {
    #[error("A date range needs exactly two dates, got {0}")]
    Incomplete(usize),

    #[error("Start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("{date} is outside the selectable window {min} to {max}")]
    OutOfWindow {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },
}

/// Bounds of the date picker plus the range it starts on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct DateWindow {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
}

impl Default for DateWindow {
    fn default() -> Self {
        // Fixed calendar constants, all valid.
        Self {
            min: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            max: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            default_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            default_end: NaiveDate::from_ymd_opt(2025, 11, 24).unwrap_or_default(),
        }
    }
}

impl DateWindow {
    /// The range preselected before the user picks anything.
    pub fn default_range(&self) -> DateRange {
        DateRange {
            start: self.default_start,
            end: self.default_end,
        }
    }

    /// The preselected range, checked like any user selection.
    ///
    /// Fails when the window is inverted or the default pair falls outside it.
    pub fn default_selection(&self) -> Result<DateRange, DateSelectionError> {
        self.validate(&[self.default_start, self.default_end])
    }

    /// Turns the dates picked by the user into a range.
    ///
    /// A picker may hand back zero, one or two dates while a selection is in
    /// progress; only a complete, ordered pair inside the window is accepted.
    pub fn validate(&self, picks: &[NaiveDate]) -> Result<DateRange, DateSelectionError> {
        let [start, end] = picks else {
            return Err(DateSelectionError::Incomplete(picks.len()));
        };
        for date in [*start, *end] {
            if date < self.min || date > self.max {
                return Err(DateSelectionError::OutOfWindow {
                    date,
                    min: self.min,
                    max: self.max,
                });
            }
        }
        DateRange::new(*start, *end).ok_or(DateSelectionError::Inverted {
            start: *start,
            end: *end,
        })
    }
}
