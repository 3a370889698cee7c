use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day's attendance marks: subject name to present/absent.
///
/// `window_start` carries the reporting-window start the caller declared when
/// the record was written; the earliest record's value seeds the default
/// window when a percentage query names no start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub marks: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_start: Option<NaiveDate>,
}

/// A user's attendance records, kept sorted ascending by date with at most
/// one record per date. Writes are full replacements: a new mark mapping for
/// an existing date wholly supersedes the old one, never merges into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceLedger {
    records: Vec<AttendanceRecord>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the record for `date` wholesale, or inserts one in date order.
    ///
    /// Callers toggling a single subject must read the existing marks, flip
    /// the one entry, and write the complete mapping back.
    pub fn upsert(
        &mut self,
        date: NaiveDate,
        marks: BTreeMap<String, bool>,
        window_start: Option<NaiveDate>,
    ) {
        match self.records.binary_search_by(|record| record.date.cmp(&date)) {
            Ok(idx) => {
                let record = &mut self.records[idx];
                record.marks = marks;
                record.window_start = window_start;
            }
            Err(idx) => self.records.insert(
                idx,
                AttendanceRecord {
                    date,
                    marks,
                    window_start,
                },
            ),
        }
    }

    /// All records with a date in `[start, end]` inclusive, ascending.
    /// An inverted or non-overlapping range yields an empty slice.
    pub fn query(&self, start: NaiveDate, end: NaiveDate) -> &[AttendanceRecord] {
        let from = self.records.partition_point(|record| record.date < start);
        let to = self.records.partition_point(|record| record.date <= end);
        if from >= to { &[] } else { &self.records[from..to] }
    }

    /// The record for exactly `date`, if one exists.
    pub fn record_on(&self, date: NaiveDate) -> Option<&AttendanceRecord> {
        self.query(date, date).first()
    }

    /// The earliest record's date.
    pub fn first_record_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|record| record.date)
    }

    /// The earliest record's declared window start, falling back to its date.
    pub fn default_window_start(&self) -> Option<NaiveDate> {
        self.records
            .first()
            .map(|record| record.window_start.unwrap_or(record.date))
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
