//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use internhub_core::error::CoreError;
use internhub_core::models::{FeedbackEntry, NewProject, Project, ProjectPatch};
use internhub_core::roles::ROLE_ADMIN;
use internhub_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/projects
///
/// Admins see every project; students see the ones assigned to them.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Project>>> {
    let projects = if user.role == ROLE_ADMIN {
        state.store.list_projects().await?
    } else {
        state.store.projects_for_identity(user.identity_id).await?
    };
    Ok(Json(projects))
}

/// POST /api/v1/projects
///
/// Status always starts at `Not Started` regardless of the request body.
pub async fn create(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title is required".into(),
        )));
    }
    let project = state.store.insert_project(input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/{id}
///
/// Visible to admins and to assigned students only.
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = state.store.project(id).await?.ok_or(CoreError::NotFound {
        entity: "Project",
        id,
    })?;
    if user.role != ROLE_ADMIN && !project.assigned_to.contains(&user.identity_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not assigned to this project".into(),
        )));
    }
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}
///
/// Partial update; any application bumps `last_modified`.
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<ProjectPatch>,
) -> AppResult<Json<Project>> {
    let project = state
        .store
        .update_project(id, patch)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project and every assignment referencing it.
pub async fn delete(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !state.store.delete_project(id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for `POST /projects/{id}/feedback`.
#[derive(Debug, Deserialize)]
pub struct ProjectFeedbackRequest {
    pub comment: String,
}

/// POST /api/v1/projects/{id}/feedback
pub async fn add_feedback(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ProjectFeedbackRequest>,
) -> AppResult<Json<Project>> {
    if input.comment.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Comment is required".into(),
        )));
    }
    let project = state
        .store
        .append_project_feedback(
            id,
            FeedbackEntry {
                comment: input.comment,
                date: Utc::now(),
                from: "admin".to_string(),
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;
    Ok(Json(project))
}
