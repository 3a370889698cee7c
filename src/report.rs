use crate::calendar::{self, CalendarError};
use crate::ledger::AttendanceRecord;
use crate::timetable::Timetable;
use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    Calendar(CalendarError),
    MissingSchedule { user_id: Uuid },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Calendar(err) => write!(f, "{err}"),
            ReportError::MissingSchedule { user_id } => {
                write!(f, "no timetable stored for user {user_id}")
            }
        }
    }
}

impl std::error::Error for ReportError {}

impl From<CalendarError> for ReportError {
    fn from(value: CalendarError) -> Self {
        Self::Calendar(value)
    }
}

/// Per-subject attendance percentages over one window, computed fresh on each
/// query and never persisted. Keys are exactly the timetable's subjects; the
/// wire shape is `{ "subject": "NN.NN" }` with two-decimal strings.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageReport {
    subjects: BTreeMap<String, f64>,
}

impl PercentageReport {
    pub fn percentage(&self, subject: &str) -> Option<f64> {
        self.subjects.get(subject).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.subjects
            .iter()
            .map(|(subject, value)| (subject.as_str(), *value))
    }

    /// The wire rendering: subject to a two-decimal string.
    pub fn formatted(&self) -> BTreeMap<String, String> {
        self.subjects
            .iter()
            .map(|(subject, value)| (subject.clone(), format!("{value:.2}")))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

impl Serialize for PercentageReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.subjects.len()))?;
        for (subject, value) in &self.subjects {
            map.serialize_entry(subject, &format!("{value:.2}"))?;
        }
        map.end()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reconciles a timetable against attendance records over an inclusive
/// window.
///
/// For each Monday-Friday date of the window, the subjects scheduled on that
/// date's weekday accrue one scheduled day apiece (once per date, even when a
/// subject repeats within the day). A record's `true` mark accrues one
/// attended day, but only when the subject is actually scheduled on that
/// record's weekday, so a stray mark can never push a percentage past the
/// denominator. Subjects with zero scheduled days report 0.00 rather than
/// failing; subjects appearing only in the ledger are excluded.
pub fn compute_percentages(
    timetable: &Timetable,
    records: &[AttendanceRecord],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<PercentageReport, CalendarError> {
    let mut scheduled_days: BTreeMap<&str, u32> = BTreeMap::new();
    for date in calendar::school_days_in_range(window_start, window_end)? {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for subject in timetable.subjects_on(date.weekday()) {
            if seen.insert(subject) {
                *scheduled_days.entry(subject).or_insert(0) += 1;
            }
        }
    }

    let mut attended_days: BTreeMap<&str, u32> = BTreeMap::new();
    for record in records {
        if record.date < window_start || record.date > window_end {
            continue;
        }
        if calendar::is_weekend(record.date) {
            continue;
        }
        let weekday = record.date.weekday();
        for (subject, present) in &record.marks {
            if *present && timetable.is_scheduled_on(subject, weekday) {
                *attended_days.entry(subject).or_insert(0) += 1;
            }
        }
    }

    let mut subjects = BTreeMap::new();
    for subject in timetable.all_subjects() {
        let scheduled = scheduled_days.get(subject.as_str()).copied().unwrap_or(0);
        let attended = attended_days.get(subject.as_str()).copied().unwrap_or(0);
        let percentage = if scheduled > 0 {
            round2(100.0 * f64::from(attended) / f64::from(scheduled))
        } else {
            0.0
        };
        subjects.insert(subject, percentage);
    }

    Ok(PercentageReport { subjects })
}
