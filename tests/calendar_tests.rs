use attendance_tool::calendar::{
    CalendarError, DateRange, is_weekend, parse_date, school_days_in_range,
};
use chrono::{Datelike, NaiveDate, Weekday};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn parse_date_accepts_strict_iso() {
    assert_eq!(parse_date("2025-03-03").unwrap(), d(2025, 3, 3));
    assert_eq!(parse_date(" 2025-12-31 ").unwrap(), d(2025, 12, 31));
}

#[test]
fn parse_date_rejects_out_of_range_month() {
    let err = parse_date("2024-13-01").unwrap_err();
    assert!(matches!(err, CalendarError::InvalidDateFormat { .. }));
}

#[test]
fn parse_date_rejects_lenient_shapes() {
    for input in ["2024-1-01", "03/10/2025", "2024-02-30", "2025-03-03T00:00", "today"] {
        assert!(
            matches!(
                parse_date(input),
                Err(CalendarError::InvalidDateFormat { .. })
            ),
            "expected '{input}' to be rejected"
        );
    }
}

#[test]
fn date_range_rejects_inverted_window() {
    let err = DateRange::new(d(2025, 3, 4), d(2025, 3, 3)).unwrap_err();
    assert!(matches!(err, CalendarError::InvalidRange { .. }));
}

#[test]
fn date_range_is_inclusive_and_ascending() {
    let dates: Vec<NaiveDate> = DateRange::new(d(2025, 2, 27), d(2025, 3, 2))
        .unwrap()
        .collect();
    assert_eq!(
        dates,
        vec![d(2025, 2, 27), d(2025, 2, 28), d(2025, 3, 1), d(2025, 3, 2)]
    );
}

#[test]
fn single_day_window_is_valid() {
    let dates: Vec<NaiveDate> = DateRange::new(d(2025, 3, 3), d(2025, 3, 3))
        .unwrap()
        .collect();
    assert_eq!(dates, vec![d(2025, 3, 3)]);
}

#[test]
fn date_range_restarts_from_a_clone() {
    let range = DateRange::new(d(2025, 3, 3), d(2025, 3, 5)).unwrap();
    let first: Vec<NaiveDate> = range.clone().collect();
    let second: Vec<NaiveDate> = range.collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn weekend_classification_uses_canonical_weekdays() {
    // 2025-03-08 is a Saturday, 2025-03-09 a Sunday, 2025-03-10 a Monday.
    assert_eq!(d(2025, 3, 8).weekday(), Weekday::Sat);
    assert!(is_weekend(d(2025, 3, 8)));
    assert!(is_weekend(d(2025, 3, 9)));
    assert!(!is_weekend(d(2025, 3, 10)));
}

#[test]
fn school_days_skip_weekends() {
    // Monday 2025-03-03 through Sunday 2025-03-09.
    let days = school_days_in_range(d(2025, 3, 3), d(2025, 3, 9)).unwrap();
    assert_eq!(
        days,
        vec![
            d(2025, 3, 3),
            d(2025, 3, 4),
            d(2025, 3, 5),
            d(2025, 3, 6),
            d(2025, 3, 7)
        ]
    );
}

#[test]
fn school_days_on_weekend_only_window_are_empty() {
    let days = school_days_in_range(d(2025, 3, 8), d(2025, 3, 9)).unwrap();
    assert!(days.is_empty());
}
