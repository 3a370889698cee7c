use attendance_tool::ledger::AttendanceLedger;
use chrono::NaiveDate;
use std::collections::BTreeMap;

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
fn records_stay_sorted_regardless_of_insertion_order() {
    let mut ledger = AttendanceLedger::new();
    ledger.upsert(d(2025, 3, 5), marks(&[("maths", true)]), None);
    ledger.upsert(d(2025, 3, 3), marks(&[("maths", true)]), None);
    ledger.upsert(d(2025, 3, 4), marks(&[("maths", false)]), None);

    let dates: Vec<NaiveDate> = ledger.records().iter().map(|record| record.date).collect();
    assert_eq!(dates, vec![d(2025, 3, 3), d(2025, 3, 4), d(2025, 3, 5)]);
}

#[test]
fn upsert_wholly_replaces_prior_marks() {
    let mut ledger = AttendanceLedger::new();
    ledger.upsert(d(2025, 3, 3), marks(&[("A", true)]), None);
    ledger.upsert(d(2025, 3, 3), marks(&[("B", true)]), None);

    let record = ledger.record_on(d(2025, 3, 3)).unwrap();
    assert_eq!(record.marks, marks(&[("B", true)]));
    assert!(!record.marks.contains_key("A"));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn upsert_is_idempotent_for_identical_input() {
    let mut ledger = AttendanceLedger::new();
    let input = marks(&[("maths", true), ("java", false)]);
    ledger.upsert(d(2025, 3, 3), input.clone(), Some(d(2025, 3, 1)));
    let before = ledger.query(d(2025, 3, 3), d(2025, 3, 3)).to_vec();

    ledger.upsert(d(2025, 3, 3), input, Some(d(2025, 3, 1)));
    let after = ledger.query(d(2025, 3, 3), d(2025, 3, 3)).to_vec();

    assert_eq!(before, after);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn query_is_inclusive_on_both_bounds() {
    let mut ledger = AttendanceLedger::new();
    for day in [3, 4, 5, 6, 7] {
        ledger.upsert(d(2025, 3, day), marks(&[("maths", true)]), None);
    }

    let slice = ledger.query(d(2025, 3, 4), d(2025, 3, 6));
    let dates: Vec<NaiveDate> = slice.iter().map(|record| record.date).collect();
    assert_eq!(dates, vec![d(2025, 3, 4), d(2025, 3, 5), d(2025, 3, 6)]);
}

#[test]
fn query_outside_or_inverted_ranges_is_empty() {
    let mut ledger = AttendanceLedger::new();
    ledger.upsert(d(2025, 3, 3), marks(&[("maths", true)]), None);

    assert!(ledger.query(d(2025, 4, 1), d(2025, 4, 30)).is_empty());
    assert!(ledger.query(d(2025, 3, 4), d(2025, 3, 3)).is_empty());
}

#[test]
fn first_record_date_tracks_earliest_entry() {
    let mut ledger = AttendanceLedger::new();
    assert_eq!(ledger.first_record_date(), None);

    ledger.upsert(d(2025, 3, 5), marks(&[("maths", true)]), None);
    ledger.upsert(d(2025, 3, 3), marks(&[("maths", true)]), None);
    assert_eq!(ledger.first_record_date(), Some(d(2025, 3, 3)));
}

#[test]
fn default_window_start_prefers_declared_start() {
    let mut ledger = AttendanceLedger::new();
    assert_eq!(ledger.default_window_start(), None);

    ledger.upsert(d(2025, 3, 5), marks(&[("maths", true)]), None);
    assert_eq!(ledger.default_window_start(), Some(d(2025, 3, 5)));

    ledger.upsert(d(2025, 3, 3), marks(&[("maths", true)]), Some(d(2025, 2, 1)));
    assert_eq!(ledger.default_window_start(), Some(d(2025, 2, 1)));
}
