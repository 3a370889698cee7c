use crate::calendar;
use crate::ledger::AttendanceLedger;
use crate::report::{self, PercentageReport, ReportError};
use crate::timetable::Timetable;
use chrono::{NaiveDate, Weekday};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    NameRequired,
    UnknownUser { user_id: Uuid },
    WeekendDate { date: NaiveDate },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::NameRequired => write!(f, "a user name is required"),
            DirectoryError::UnknownUser { user_id } => write!(f, "no user {user_id}"),
            DirectoryError::WeekendDate { date } => {
                write!(f, "attendance cannot be marked for weekend date {date}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct UserEntry {
    name: String,
    timetable: Timetable,
    ledger: AttendanceLedger,
}

/// The aggregate the surrounding layers operate on: every known user with
/// their timetable and attendance ledger. Timetable and ledger have
/// independent lifecycles but share their owner, so deleting a user drops
/// both.
///
/// The directory itself is plain data; snapshot consistency under concurrent
/// access is the caller's job (the HTTP layer reads or writes under one lock
/// guard per request).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDirectory {
    users: BTreeMap<Uuid, UserEntry>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and injects their starting timetable. The default
    /// timetable is passed in explicitly (`Timetable::default_weekly()` for
    /// the stock one) so this layer stays the single owner of that choice.
    pub fn create_user(
        &mut self,
        name: &str,
        timetable: Timetable,
    ) -> Result<User, DirectoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::NameRequired);
        }
        let id = Uuid::new_v4();
        self.users.insert(
            id,
            UserEntry {
                name: name.to_string(),
                timetable,
                ledger: AttendanceLedger::new(),
            },
        );
        info!("created user {id} ({name})");
        Ok(User {
            id,
            name: name.to_string(),
        })
    }

    /// Reinstates a user from a persisted snapshot, ledger and timetable
    /// included. Store loaders only; new users go through `create_user`.
    pub(crate) fn restore_user(
        &mut self,
        user: User,
        timetable: Timetable,
        ledger: AttendanceLedger,
    ) {
        self.users.insert(
            user.id,
            UserEntry {
                name: user.name,
                timetable,
                ledger,
            },
        );
    }

    pub fn users(&self) -> Vec<User> {
        self.users
            .iter()
            .map(|(id, entry)| User {
                id: *id,
                name: entry.name.clone(),
            })
            .collect()
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.users.get(&user_id).map(|entry| User {
            id: user_id,
            name: entry.name.clone(),
        })
    }

    /// Removes a user along with their timetable and ledger. Returns false
    /// when the user was unknown.
    pub fn delete_user(&mut self, user_id: Uuid) -> bool {
        let removed = self.users.remove(&user_id).is_some();
        if removed {
            info!("deleted user {user_id} and their attendance data");
        }
        removed
    }

    pub fn timetable(&self, user_id: Uuid) -> Option<&Timetable> {
        self.users.get(&user_id).map(|entry| &entry.timetable)
    }

    pub fn ledger(&self, user_id: Uuid) -> Option<&AttendanceLedger> {
        self.users.get(&user_id).map(|entry| &entry.ledger)
    }

    /// Atomically replaces one weekday's subject list in a user's timetable.
    pub fn replace_timetable_day(
        &mut self,
        user_id: Uuid,
        weekday: Weekday,
        subjects: Vec<String>,
    ) -> Result<(), DirectoryError> {
        let entry = self
            .users
            .get_mut(&user_id)
            .ok_or(DirectoryError::UnknownUser { user_id })?;
        entry.timetable.replace_day(weekday, subjects);
        Ok(())
    }

    /// Writes one day's attendance marks, wholly replacing any existing
    /// record for that date. Weekend dates are rejected: the domain has no
    /// weekend sessions, so a weekend record could only corrupt reports.
    pub fn record_attendance(
        &mut self,
        user_id: Uuid,
        date: NaiveDate,
        marks: BTreeMap<String, bool>,
        window_start: Option<NaiveDate>,
    ) -> Result<(), DirectoryError> {
        if calendar::is_weekend(date) {
            return Err(DirectoryError::WeekendDate { date });
        }
        let entry = self
            .users
            .get_mut(&user_id)
            .ok_or(DirectoryError::UnknownUser { user_id })?;
        info!(
            "attendance upsert for user {user_id} on {date}: {} subject(s)",
            marks.len()
        );
        entry.ledger.upsert(date, marks, window_start);
        Ok(())
    }

    /// Computes the per-subject attendance report for one user.
    ///
    /// `start` defaults to the ledger's declared window start (epoch when the
    /// ledger is empty) and `end` to `today`, which the caller supplies so
    /// the computation stays a pure function of its inputs. Refuses with
    /// `MissingSchedule` when the user is unknown: an absent timetable means
    /// the denominators are unknowable, which is not the same as zero.
    pub fn percentage_report(
        &self,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<PercentageReport, ReportError> {
        let entry = self
            .users
            .get(&user_id)
            .ok_or(ReportError::MissingSchedule { user_id })?;
        // NaiveDate::default() is 1970-01-01, the empty-ledger floor.
        let window_start = start
            .or_else(|| entry.ledger.default_window_start())
            .unwrap_or_default();
        let window_end = end.unwrap_or(today);
        let records = entry.ledger.query(window_start, window_end);
        report::compute_percentages(&entry.timetable, records, window_start, window_end)
            .map_err(ReportError::from)
    }
}
