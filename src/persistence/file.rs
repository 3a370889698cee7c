use super::{PersistenceError, PersistenceResult};
use crate::directory::UserDirectory;
use crate::ledger::AttendanceLedger;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

pub fn save_directory_to_json<P: AsRef<Path>>(
    directory: &UserDirectory,
    path: P,
) -> PersistenceResult<()> {
    super::validate_directory(directory)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, directory)?;
    Ok(())
}

pub fn load_directory_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<UserDirectory> {
    let file = File::open(path)?;
    let directory: UserDirectory = serde_json::from_reader(file)?;
    super::validate_directory(&directory)?;
    Ok(directory)
}

/// Flat CSV shape for one ledger: a row per (date, subject) mark. A row with
/// an empty subject stands for a record with no marks, so empty records
/// survive a round trip.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerCsvRecord {
    date: String,
    subject: String,
    present: bool,
    window_start: String,
}

pub fn save_ledger_to_csv<P: AsRef<Path>>(
    ledger: &AttendanceLedger,
    path: P,
) -> PersistenceResult<()> {
    super::validate_ledger(ledger)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in ledger.records() {
        let date = format_date(record.date);
        let window_start = record.window_start.map(format_date).unwrap_or_default();
        if record.marks.is_empty() {
            writer.serialize(LedgerCsvRecord {
                date,
                subject: String::new(),
                present: false,
                window_start,
            })?;
            continue;
        }
        for (subject, present) in &record.marks {
            writer.serialize(LedgerCsvRecord {
                date: date.clone(),
                subject: subject.clone(),
                present: *present,
                window_start: window_start.clone(),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn load_ledger_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<AttendanceLedger> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    struct DayRows {
        marks: BTreeMap<String, bool>,
        window_start: Option<NaiveDate>,
    }
    let mut days: BTreeMap<NaiveDate, DayRows> = BTreeMap::new();

    for row in reader.deserialize::<LedgerCsvRecord>() {
        let row = row?;
        let date = parse_date(&row.date)?;
        let window_start = parse_optional_date(&row.window_start)?;
        let day = days.entry(date).or_insert_with(|| DayRows {
            marks: BTreeMap::new(),
            window_start,
        });
        if day.window_start != window_start {
            return Err(PersistenceError::InvalidData(format!(
                "conflicting window_start values for {date}"
            )));
        }
        if row.subject.is_empty() {
            continue;
        }
        if day.marks.insert(row.subject.clone(), row.present).is_some() {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate mark for subject '{}' on {date}",
                row.subject
            )));
        }
    }

    let mut ledger = AttendanceLedger::new();
    for (date, day) in days {
        ledger.upsert(date, day.marks, day.window_start);
    }
    Ok(ledger)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_optional_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_date(input).map(Some)
}
