use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::calendar::{self, CalendarError};
use crate::directory::{DirectoryError, User, UserDirectory};
use crate::ledger::AttendanceRecord;
use crate::report::{PercentageReport, ReportError};
use crate::timetable::{Timetable, weekday_from_name};

#[derive(Clone)]
pub struct AppState {
    directory: Arc<RwLock<UserDirectory>>,
}

impl AppState {
    pub fn new(directory: UserDirectory) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
        }
    }

    pub fn with_shared(directory: Arc<RwLock<UserDirectory>>) -> Self {
        Self { directory }
    }

    fn directory(&self) -> Arc<RwLock<UserDirectory>> {
        self.directory.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<CalendarError> for ApiError {
    fn from(value: CalendarError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<DirectoryError> for ApiError {
    fn from(value: DirectoryError) -> Self {
        match value {
            DirectoryError::UnknownUser { .. } => ApiError::NotFound(value.to_string()),
            DirectoryError::NameRequired | DirectoryError::WeekendDate { .. } => {
                ApiError::Invalid(value.to_string())
            }
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(value: ReportError) -> Self {
        match value {
            ReportError::MissingSchedule { .. } => ApiError::NotFound(value.to_string()),
            ReportError::Calendar(err) => ApiError::from(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id", delete(delete_user))
        .route("/timetable/:user_id", get(get_timetable))
        .route("/timetable/:user_id/:day", post(replace_timetable_day))
        .route("/attendance", post(record_attendance))
        .route("/attendance/:user_id", get(get_attendance))
        .route("/attendance/:user_id/percentage", get(attendance_percentage))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, directory: UserDirectory) -> std::io::Result<()> {
    let state = AppState::new(directory);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let directory = state.directory();
    let users = {
        let guard = directory.read();
        guard.users()
    };
    Json(users)
}

#[derive(Debug, Deserialize)]
struct CreateUserPayload {
    name: String,
}

async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let directory = state.directory();
    let user = {
        let mut guard = directory.write();
        guard.create_user(&payload.name, Timetable::default_weekly())?
    };
    Ok((StatusCode::CREATED, Json(user)))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let directory = state.directory();
    let removed = {
        let mut guard = directory.write();
        guard.delete_user(user_id)
    };
    if !removed {
        return Err(ApiError::not_found(format!("no user {user_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_timetable(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Timetable>, ApiError> {
    let directory = state.directory();
    let timetable = {
        let guard = directory.read();
        guard.timetable(user_id).cloned()
    };
    match timetable {
        Some(timetable) => Ok(Json(timetable)),
        None => Err(ApiError::not_found(format!(
            "no timetable stored for user {user_id}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct ReplaceDayPayload {
    subjects: Vec<String>,
}

async fn replace_timetable_day(
    State(state): State<AppState>,
    Path((user_id, day)): Path<(Uuid, String)>,
    Json(payload): Json<ReplaceDayPayload>,
) -> Result<Json<Timetable>, ApiError> {
    let Some(weekday) = weekday_from_name(&day) else {
        return Err(ApiError::invalid(format!("unknown weekday '{day}'")));
    };
    let directory = state.directory();
    {
        let mut guard = directory.write();
        guard.replace_timetable_day(user_id, weekday, payload.subjects)?;
    }
    let updated = {
        let guard = directory.read();
        guard.timetable(user_id).cloned()
    };
    updated
        .map(Json)
        .ok_or_else(|| ApiError::internal("timetable not found after update"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordAttendancePayload {
    user_id: Uuid,
    date: String,
    subjects: BTreeMap<String, bool>,
    #[serde(default)]
    start_date: Option<String>,
}

async fn record_attendance(
    State(state): State<AppState>,
    Json(payload): Json<RecordAttendancePayload>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    let date = calendar::parse_date(&payload.date)?;
    let window_start = match payload.start_date.as_deref() {
        Some(raw) => Some(calendar::parse_date(raw)?),
        None => None,
    };
    let directory = state.directory();
    {
        let mut guard = directory.write();
        guard.record_attendance(payload.user_id, date, payload.subjects, window_start)?;
    }
    let stored = {
        let guard = directory.read();
        guard
            .ledger(payload.user_id)
            .and_then(|ledger| ledger.record_on(date).cloned())
    };
    stored
        .map(Json)
        .ok_or_else(|| ApiError::internal("attendance record not found after upsert"))
}

async fn get_attendance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<BTreeMap<String, BTreeMap<String, bool>>>, ApiError> {
    let directory = state.directory();
    let records = {
        let guard = directory.read();
        guard
            .ledger(user_id)
            .map(|ledger| ledger.records().to_vec())
    };
    let Some(records) = records else {
        return Err(ApiError::not_found(format!("no user {user_id}")));
    };
    let by_date = records
        .into_iter()
        .map(|record| (record.date.format("%Y-%m-%d").to_string(), record.marks))
        .collect();
    Ok(Json(by_date))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PercentageQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

async fn attendance_percentage(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PercentageQuery>,
) -> Result<Json<PercentageReport>, ApiError> {
    let start = match query.start_date.as_deref() {
        Some(raw) => Some(calendar::parse_date(raw)?),
        None => None,
    };
    let end = match query.end_date.as_deref() {
        Some(raw) => Some(calendar::parse_date(raw)?),
        None => None,
    };
    // "Today" in the canonical calendar, resolved here at the boundary so the
    // engine itself stays a pure function of its arguments.
    let today = Utc::now().date_naive();
    let directory = state.directory();
    let report = {
        let guard = directory.read();
        guard.percentage_report(user_id, start, end, today)?
    };
    Ok(Json(report))
}
