//! Handlers for the `/students/me` resource: the student's own profile,
//! progress, and project submissions.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use internhub_core::error::CoreError;
use internhub_core::lifecycle;
use internhub_core::merge::merge_progress;
use internhub_core::models::{
    AttendanceEntry, AttendanceSource, Identity, IdentityPatch, NewAttendance, ProgressUpdate,
    Project,
};
use internhub_core::roles::ROLE_ADMIN;
use internhub_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

async fn own_identity(state: &AppState, id: DbId) -> Result<Identity, CoreError> {
    state.store.identity(id).await?.ok_or(CoreError::NotFound {
        entity: "Student",
        id,
    })
}

/// Response body for `GET /students/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub profile: Identity,
    pub projects: Vec<Project>,
}

/// GET /api/v1/students/me
pub async fn me(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<MeResponse>> {
    let profile = own_identity(&state, user.identity_id).await?;
    let projects = state.store.projects_for_identity(user.identity_id).await?;
    Ok(Json(MeResponse { profile, projects }))
}

/// Request body for `PUT /students/me`.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub contact_number: Option<String>,
    pub program: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub resume_link: Option<String>,
    pub profile_picture: Option<String>,
    /// Free-form profile attributes (skills, department, domain, ...).
    pub attributes: Option<BTreeMap<String, String>>,
}

/// PUT /api/v1/students/me
pub async fn update_me(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProfileUpdateRequest>,
) -> AppResult<Json<Identity>> {
    let identity = state
        .store
        .update_identity(
            user.identity_id,
            IdentityPatch {
                contact_number: input.contact_number,
                program: input.program,
                university: input.university,
                graduation_year: input.graduation_year,
                bio: input.bio,
                resume_link: input.resume_link,
                profile_picture: input.profile_picture,
                attributes: input.attributes,
                ..IdentityPatch::default()
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Student",
            id: user.identity_id,
        })?;
    Ok(Json(identity))
}

/// POST /api/v1/students/me/attendance
///
/// Self-reported attendance. Kept in its own stream, separate from
/// admin-recorded entries; reads merge the two.
pub async fn report_attendance(
    user: AuthUser,
    State(state): State<AppState>,
    Json(entry): Json<NewAttendance>,
) -> AppResult<(StatusCode, Json<AttendanceEntry>)> {
    let stored = state
        .store
        .append_attendance(user.identity_id, entry, AttendanceSource::SelfReported)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/students/me/progress
///
/// Own updates, newest first.
pub async fn my_progress(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProgressUpdate>>> {
    let identity = own_identity(&state, user.identity_id).await?;
    Ok(Json(merge_progress(&identity.progress_updates, &[])))
}

/// Request body for progress submission.
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub content: String,
}

/// Response body for a general progress submission.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub update: ProgressUpdate,
    pub progress_pct: i32,
}

/// POST /api/v1/students/me/progress
///
/// Appends a general progress update and recomputes the completion
/// percentage.
pub async fn submit_progress(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProgressRequest>,
) -> AppResult<(StatusCode, Json<ProgressResponse>)> {
    let (update, progress_pct) =
        lifecycle::submit_progress(state.store.as_ref(), user.identity_id, input.content).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProgressResponse {
            update,
            progress_pct,
        }),
    ))
}

/// Response body for a project progress submission.
#[derive(Debug, Serialize)]
pub struct ProjectProgressResponse {
    pub update: ProgressUpdate,
    pub project: Project,
}

/// POST /api/v1/students/me/projects/{id}/progress
///
/// Progress against a specific project. Requires assignment (admins are
/// exempt); a `Not Started` project auto-transitions to `In Progress` and a
/// feedback entry is attached to the project.
pub async fn submit_project_progress(
    user: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<ProgressRequest>,
) -> AppResult<(StatusCode, Json<ProjectProgressResponse>)> {
    let allow_unassigned = user.role == ROLE_ADMIN;
    let (update, project) = lifecycle::submit_project_progress(
        state.store.as_ref(),
        user.identity_id,
        project_id,
        input.content,
        allow_unassigned,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ProjectProgressResponse { update, project }),
    ))
}
