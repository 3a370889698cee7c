use crate::directory::UserDirectory;
use crate::ledger::AttendanceLedger;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no directory stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Snapshot persistence seam for the user directory. Implementations must
/// write one consistent snapshot at a time; the core never talks to a store
/// mid-computation.
pub trait AttendanceStore {
    fn save_directory(&self, directory: &UserDirectory) -> PersistenceResult<()>;
    fn load_directory(&self) -> PersistenceResult<Option<UserDirectory>>;
}

/// Checks the ledger invariant a loaded snapshot must satisfy: strictly
/// ascending record dates, hence at most one record per date.
pub fn validate_ledger(ledger: &AttendanceLedger) -> PersistenceResult<()> {
    for pair in ledger.records().windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(PersistenceError::InvalidData(format!(
                "attendance records out of order or duplicated at {}",
                pair[1].date
            )));
        }
    }
    Ok(())
}

pub fn validate_directory(directory: &UserDirectory) -> PersistenceResult<()> {
    for user in directory.users() {
        if user.name.trim().is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "user {} has an empty name",
                user.id
            )));
        }
        if let Some(ledger) = directory.ledger(user.id) {
            validate_ledger(ledger)?;
        }
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_directory_from_json, load_ledger_from_csv, save_directory_to_json, save_ledger_to_csv,
};
