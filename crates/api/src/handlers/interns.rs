//! Handlers for the `/interns` resource: the admin-facing intern lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use internhub_core::error::CoreError;
use internhub_core::lifecycle::{self, CreateIntern, InternView, UpdateIntern};
use internhub_core::models::{
    AttendanceEntry, AttendanceSource, NewAttendance, PastIntern, PastInternStats,
};
use internhub_core::tasks::TaskInput;
use internhub_core::types::{DbId, Timestamp};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /interns`.
///
/// `tasks` accepts either a JSON list of names or a single comma-delimited
/// string. Supplying `student_id` links the engagement to an existing account
/// instead of creating a fresh identity.
#[derive(Debug, Deserialize)]
pub struct CreateInternRequest {
    pub name: String,
    pub email: String,
    pub duration_months: Option<i32>,
    pub university: Option<String>,
    pub student_id: Option<DbId>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tasks: Option<TaskInput>,
}

/// Request body for `PUT /interns/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateInternRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub joining_date: Option<Timestamp>,
    pub duration_months: Option<i32>,
    pub university: Option<String>,
    pub tasks: Option<TaskInput>,
}

/// Request body for `PUT /interns/{id}/credentials`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response body for `GET /interns/past/{id}`.
#[derive(Debug, Serialize)]
pub struct PastInternDetail {
    #[serde(flatten)]
    pub snapshot: PastIntern,
    pub stats: PastInternStats,
}

fn hash_optional(password: Option<String>) -> AppResult<Option<String>> {
    match password {
        Some(password) => {
            validate_password_strength(&password, MIN_PASSWORD_LENGTH)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            let hash = hash_password(&password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
            Ok(Some(hash))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/interns
pub async fn list(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InternView>>> {
    Ok(Json(lifecycle::list_interns(state.store.as_ref()).await?))
}

/// POST /api/v1/interns
///
/// Creates the engagement and fans the task list out into projects.
pub async fn create(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateInternRequest>,
) -> AppResult<(StatusCode, Json<InternView>)> {
    if input.name.trim().is_empty() || input.email.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Name and email are required".into(),
        )));
    }

    let password_hash = hash_optional(input.password)?;
    let tasks = input.tasks.map(TaskInput::into_names).unwrap_or_default();

    let view = lifecycle::create_intern(
        state.store.as_ref(),
        Utc::now(),
        CreateIntern {
            name: input.name,
            email: input.email,
            duration_months: input.duration_months,
            university: input.university,
            student_id: input.student_id,
            username: input.username,
            password_hash,
            tasks,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/interns/{id}
pub async fn get(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<InternView>> {
    Ok(Json(lifecycle::intern_view(state.store.as_ref(), id).await?))
}

/// PUT /api/v1/interns/{id}
///
/// Profile update plus task-list diffing; only new names fan out.
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInternRequest>,
) -> AppResult<Json<InternView>> {
    let view = lifecycle::update_intern(
        state.store.as_ref(),
        id,
        UpdateIntern {
            name: input.name,
            email: input.email,
            joining_date: input.joining_date,
            duration_months: input.duration_months,
            university: input.university,
            tasks: input.tasks.map(TaskInput::into_names),
        },
    )
    .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/interns/{id}
///
/// The archive transition: snapshot to a past intern, release projects,
/// deactivate the identity. Returns the snapshot.
pub async fn archive(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PastIntern>> {
    let snapshot = lifecycle::archive_intern(
        state.store.as_ref(),
        id,
        state.config.archive_cascade_delete,
    )
    .await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/interns/{id}/credentials
pub async fn update_credentials(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let password_hash = hash_optional(input.password)?;
    lifecycle::update_credentials(state.store.as_ref(), id, input.username, password_hash).await?;
    Ok(Json(json!({ "message": "Credentials updated" })))
}

/// POST /api/v1/interns/{id}/attendance
pub async fn record_attendance(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(entry): Json<NewAttendance>,
) -> AppResult<(StatusCode, Json<AttendanceEntry>)> {
    let stored =
        lifecycle::record_attendance(state.store.as_ref(), id, entry, AttendanceSource::Admin)
            .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/interns/past
pub async fn list_past(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PastIntern>>> {
    Ok(Json(lifecycle::past_interns(state.store.as_ref()).await?))
}

/// GET /api/v1/interns/past/{id}
pub async fn get_past(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PastInternDetail>> {
    let (snapshot, stats) = lifecycle::past_intern_detail(state.store.as_ref(), id).await?;
    Ok(Json(PastInternDetail { snapshot, stats }))
}
