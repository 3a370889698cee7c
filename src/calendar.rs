use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::fmt;

/// Date handling for the whole crate runs through this module. Every date is a
/// `chrono::NaiveDate` in the proleptic Gregorian civil calendar (no
/// time-of-day, no timezone), and weekday classification always goes through
/// `NaiveDate::weekday()`. Mixing in a second weekday derivation (local
/// wall-clock, for instance) is the defect class this module exists to avoid.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    InvalidDateFormat { input: String },
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::InvalidDateFormat { input } => {
                write!(f, "invalid date '{input}': expected YYYY-MM-DD")
            }
            CalendarError::InvalidRange { start, end } => {
                write!(f, "window start {start} must be on or before window end {end}")
            }
        }
    }
}

impl std::error::Error for CalendarError {}

/// Parses a strict `YYYY-MM-DD` date string.
///
/// Rejects anything chrono would be lenient about (unpadded components,
/// trailing text) as well as out-of-range months and days.
pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
    let invalid = || CalendarError::InvalidDateFormat {
        input: input.to_string(),
    };
    let trimmed = input.trim();
    if trimmed.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid())
}

/// Inclusive, ascending iterator over every calendar day of a window.
///
/// The range is finite and restartable: it is `Clone`, and cloning before
/// iterating leaves the source range untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        Ok(Self {
            next: Some(start),
            end,
        })
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = if current < self.end {
            Some(current + Duration::days(1))
        } else {
            None
        };
        Some(current)
    }
}

/// True for Saturday and Sunday in the canonical calendar.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All Monday-Friday dates of the inclusive window, ascending.
pub fn school_days_in_range(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, CalendarError> {
    Ok(DateRange::new(start, end)?
        .filter(|date| !is_weekend(*date))
        .collect())
}
