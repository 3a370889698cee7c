use super::{AttendanceStore, PersistenceError, PersistenceResult};
use crate::directory::{User, UserDirectory};
use crate::ledger::{AttendanceLedger, AttendanceRecord};
use crate::timetable::Timetable;
use log::info;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use uuid::Uuid;

const SNAPSHOT_VERSION: i64 = 1;

/// Document-style SQLite store: ids and dates are indexed columns, everything
/// else rides along as JSON. A save writes one full snapshot per transaction.
pub struct SqliteAttendanceStore {
    connection: Mutex<Connection>,
}

impl SqliteAttendanceStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(&path)?;
        Self::initialize_schema(&connection)?;
        info!("opened attendance store at {}", path.as_ref().display());
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS directory_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS timetables (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                timetable_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS attendance_records (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                record_json TEXT NOT NULL,
                PRIMARY KEY (user_id, date)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_user(
        tx: &rusqlite::Transaction,
        user: &User,
        timetable: &Timetable,
        ledger: &AttendanceLedger,
    ) -> PersistenceResult<()> {
        tx.execute(
            "INSERT INTO users (id, name) VALUES (?1, ?2)",
            params![user.id.to_string(), user.name],
        )?;
        let timetable_json = serde_json::to_string(timetable)?;
        tx.execute(
            "INSERT INTO timetables (user_id, timetable_json) VALUES (?1, ?2)",
            params![user.id.to_string(), timetable_json],
        )?;
        let mut stmt = tx.prepare(
            "INSERT INTO attendance_records (user_id, date, record_json) VALUES (?1, ?2, ?3)",
        )?;
        for record in ledger.records() {
            let record_json = serde_json::to_string(record)?;
            stmt.execute(params![
                user.id.to_string(),
                record.date.format("%Y-%m-%d").to_string(),
                record_json
            ])?;
        }
        Ok(())
    }

    fn load_user(
        conn: &Connection,
        user: User,
        directory: &mut UserDirectory,
    ) -> PersistenceResult<()> {
        let timetable_json: Option<String> = conn
            .query_row(
                "SELECT timetable_json FROM timetables WHERE user_id = ?1",
                params![user.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let timetable = match timetable_json {
            Some(json) => serde_json::from_str(&json)?,
            None => Timetable::new(),
        };

        let mut stmt = conn.prepare(
            "SELECT record_json FROM attendance_records WHERE user_id = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![user.id.to_string()], |row| row.get::<_, String>(0))?;
        let mut ledger = AttendanceLedger::new();
        for json in rows {
            let record: AttendanceRecord = serde_json::from_str(&json?)?;
            ledger.upsert(record.date, record.marks, record.window_start);
        }

        directory.restore_user(user, timetable, ledger);
        Ok(())
    }
}

impl AttendanceStore for SqliteAttendanceStore {
    fn save_directory(&self, directory: &UserDirectory) -> PersistenceResult<()> {
        super::validate_directory(directory)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM attendance_records", [])?;
        tx.execute("DELETE FROM timetables", [])?;
        tx.execute("DELETE FROM users", [])?;
        tx.execute("DELETE FROM directory_meta", [])?;
        tx.execute(
            "INSERT INTO directory_meta (id, version) VALUES (1, ?1)",
            params![SNAPSHOT_VERSION],
        )?;
        for user in directory.users() {
            let timetable = directory
                .timetable(user.id)
                .cloned()
                .unwrap_or_else(Timetable::new);
            let ledger = directory
                .ledger(user.id)
                .cloned()
                .unwrap_or_else(AttendanceLedger::new);
            Self::save_user(&tx, &user, &timetable, &ledger)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_directory(&self) -> PersistenceResult<Option<UserDirectory>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let version: Option<i64> = conn
            .query_row("SELECT version FROM directory_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        if version.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare("SELECT id, name FROM users ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut users = Vec::new();
        for row in rows {
            let (id, name) = row?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| PersistenceError::InvalidData(format!("invalid user id '{id}': {e}")))?;
            users.push(User { id, name });
        }

        let mut directory = UserDirectory::new();
        for user in users {
            Self::load_user(&conn, user, &mut directory)?;
        }
        super::validate_directory(&directory)?;
        Ok(Some(directory))
    }
}
