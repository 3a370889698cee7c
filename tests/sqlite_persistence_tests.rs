#![cfg(feature = "sqlite")]

use attendance_tool::persistence::AttendanceStore;
use attendance_tool::persistence::sqlite::SqliteAttendanceStore;
use attendance_tool::{Timetable, UserDirectory};
use chrono::{NaiveDate, Weekday};
use std::collections::BTreeMap;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn marks(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
    entries
        .iter()
        .map(|(subject, present)| (subject.to_string(), *present))
        .collect()
}

#[test]
fn fresh_store_loads_nothing() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteAttendanceStore::new(file.path()).unwrap();
    assert!(store.load_directory().unwrap().is_none());
}

#[test]
fn sqlite_store_round_trips_the_directory() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteAttendanceStore::new(file.path()).unwrap();

    let mut directory = UserDirectory::new();
    let user = directory
        .create_user("dinesh", Timetable::default_weekly())
        .unwrap();
    directory
        .replace_timetable_day(user.id, Weekday::Mon, vec!["maths".into(), "java".into()])
        .unwrap();
    directory
        .record_attendance(
            user.id,
            d(2025, 3, 3),
            marks(&[("maths", true), ("java", false)]),
            Some(d(2025, 3, 3)),
        )
        .unwrap();
    directory
        .record_attendance(user.id, d(2025, 3, 4), marks(&[("maths", true)]), None)
        .unwrap();

    store.save_directory(&directory).expect("save directory");
    let loaded = store
        .load_directory()
        .expect("load directory")
        .expect("directory exists");

    assert_eq!(loaded, directory);
    let ledger = loaded.ledger(user.id).unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.first_record_date(), Some(d(2025, 3, 3)));
    assert_eq!(
        loaded.timetable(user.id).unwrap().subjects_on(Weekday::Mon),
        ["maths", "java"]
    );
}

#[test]
fn save_replaces_the_previous_snapshot() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteAttendanceStore::new(file.path()).unwrap();

    let mut directory = UserDirectory::new();
    let user = directory
        .create_user("dinesh", Timetable::default_weekly())
        .unwrap();
    store.save_directory(&directory).unwrap();

    directory
        .record_attendance(user.id, d(2025, 3, 3), marks(&[("maths", true)]), None)
        .unwrap();
    directory.delete_user(user.id);
    directory.create_user("priya", Timetable::default_weekly()).unwrap();
    store.save_directory(&directory).unwrap();

    let loaded = store.load_directory().unwrap().unwrap();
    assert_eq!(loaded, directory);
    assert_eq!(loaded.users().len(), 1);
    assert_eq!(loaded.users()[0].name, "priya");
    assert!(loaded.ledger(user.id).is_none());
}

#[test]
fn empty_directory_snapshot_round_trips() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteAttendanceStore::new(file.path()).unwrap();

    store.save_directory(&UserDirectory::new()).unwrap();
    let loaded = store.load_directory().unwrap().expect("snapshot exists");
    assert!(loaded.users().is_empty());
}
