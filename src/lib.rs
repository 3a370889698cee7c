pub mod calendar;
pub mod directory;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ledger;
pub mod persistence;
pub mod report;
pub mod timetable;

pub use calendar::{CalendarError, DateRange, is_weekend, parse_date, school_days_in_range};
pub use directory::{DirectoryError, User, UserDirectory};
pub use ledger::{AttendanceLedger, AttendanceRecord};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteAttendanceStore;
pub use persistence::{
    AttendanceStore, PersistenceError, load_directory_from_json, load_ledger_from_csv,
    save_directory_to_json, save_ledger_to_csv, validate_directory, validate_ledger,
};
pub use report::{PercentageReport, ReportError, compute_percentages};
pub use timetable::{Timetable, weekday_from_name, weekday_name};
