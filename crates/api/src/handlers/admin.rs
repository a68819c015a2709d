//! Handlers for the `/admin` resource: registration review, student roster,
//! attendance, progress feedback, and the admin's own profile/settings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use internhub_core::error::CoreError;
use internhub_core::merge::merge_attendance;
use internhub_core::models::{
    AttendanceEntry, AttendanceSource, Identity, IdentityPatch, NewAttendance,
    NotificationSettings, PendingStudent, ProgressUpdate, SecuritySettings,
};
use internhub_core::registration;
use internhub_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use internhub_core::types::{DbId, Timestamp};

use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Registration review
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/registrations
pub async fn list_registrations(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PendingStudent>>> {
    Ok(Json(state.store.list_pending().await?))
}

/// POST /api/v1/admin/registrations/{id}/approve
pub async fn approve_registration(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<Identity>)> {
    let identity = registration::approve(state.store.as_ref(), id).await?;
    Ok((StatusCode::CREATED, Json(identity)))
}

/// POST /api/v1/admin/registrations/{id}/reject
pub async fn reject_registration(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    registration::reject(state.store.as_ref(), id).await?;
    Ok(Json(json!({ "message": "Registration rejected" })))
}

// ---------------------------------------------------------------------------
// Student roster
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/students
pub async fn list_students(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Identity>>> {
    Ok(Json(state.store.list_identities(Some(ROLE_STUDENT)).await?))
}

/// GET /api/v1/admin/students/{id}
pub async fn get_student(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Identity>> {
    let identity = state.store.identity(id).await?.ok_or(CoreError::NotFound {
        entity: "Student",
        id,
    })?;
    Ok(Json(identity))
}

/// POST /api/v1/admin/students/{id}/attendance
///
/// Record an admin-side attendance entry for any student.
pub async fn record_student_attendance(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(entry): Json<NewAttendance>,
) -> AppResult<(StatusCode, Json<AttendanceEntry>)> {
    let stored = state
        .store
        .append_attendance(id, entry, AttendanceSource::Admin)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/admin/students/{id}/attendance
///
/// The student's merged attendance, newest first, across both sources.
/// Readable by admins and by the student themself.
pub async fn get_student_attendance(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<AttendanceEntry>>> {
    if user.role != ROLE_ADMIN && user.identity_id != id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not allowed to view another student's attendance".into(),
        )));
    }
    let identity = state.store.identity(id).await?.ok_or(CoreError::NotFound {
        entity: "Student",
        id,
    })?;
    let (admin, self_reported): (Vec<AttendanceEntry>, Vec<AttendanceEntry>) = identity
        .attendance
        .into_iter()
        .partition(|entry| entry.source == AttendanceSource::Admin);
    Ok(Json(merge_attendance(&admin, &self_reported)))
}

// ---------------------------------------------------------------------------
// Progress review
// ---------------------------------------------------------------------------

/// One student's progress update in the admin-wide review feed.
#[derive(Debug, Serialize)]
pub struct ProgressFeedEntry {
    pub student_id: DbId,
    pub student_name: String,
    #[serde(flatten)]
    pub update: ProgressUpdate,
}

/// GET /api/v1/admin/progress-updates
///
/// Every student's updates in one feed, newest first.
pub async fn list_progress_updates(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProgressFeedEntry>>> {
    let students = state.store.list_identities(Some(ROLE_STUDENT)).await?;
    let mut feed: Vec<ProgressFeedEntry> = students
        .into_iter()
        .flat_map(|student| {
            let (student_id, student_name) = (student.id, student.name);
            student
                .progress_updates
                .into_iter()
                .map(move |update| ProgressFeedEntry {
                    student_id,
                    student_name: student_name.clone(),
                    update,
                })
        })
        .collect();
    feed.sort_by_key(|entry| std::cmp::Reverse(entry.update.timestamp));
    Ok(Json(feed))
}

/// Request body for attaching feedback to a progress update.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

/// POST /api/v1/admin/progress-updates/{id}/feedback
///
/// One-shot feedback attachment; the update stays append-only otherwise.
pub async fn progress_feedback(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<FeedbackRequest>,
) -> AppResult<Json<ProgressFeedEntry>> {
    if input.feedback.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Feedback is required".into(),
        )));
    }

    let (student_id, _) = state
        .store
        .find_progress_update(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ProgressUpdate",
            id,
        })?;
    let student = state
        .store
        .identity(student_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Student",
            id: student_id,
        })?;

    let at: Timestamp = Utc::now();
    let update = state
        .store
        .set_progress_feedback(id, &input.feedback, at)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ProgressUpdate",
            id,
        })?;

    Ok(Json(ProgressFeedEntry {
        student_id,
        student_name: student.name,
        update,
    }))
}

// ---------------------------------------------------------------------------
// Admin profile and settings
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/profile
pub async fn get_profile(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Identity>> {
    let identity = state
        .store
        .identity(user.identity_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Identity",
            id: user.identity_id,
        })?;
    Ok(Json(identity))
}

/// Request body for `PUT /admin/profile`.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

/// PUT /api/v1/admin/profile
///
/// Uniqueness of email/username is enforced by the store and surfaces as 409.
pub async fn update_profile(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ProfileUpdateRequest>,
) -> AppResult<Json<Identity>> {
    let identity = state
        .store
        .update_identity(
            user.identity_id,
            IdentityPatch {
                name: input.name,
                email: input.email,
                username: input.username,
                ..IdentityPatch::default()
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Identity",
            id: user.identity_id,
        })?;
    Ok(Json(identity))
}

/// Request body for `PUT /admin/password`.
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /api/v1/admin/password
///
/// Verifies the current password before rehashing the new one.
pub async fn change_password(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<PasswordChangeRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let identity = state
        .store
        .identity(user.identity_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Identity",
            id: user.identity_id,
        })?;

    let hash = identity
        .password_hash
        .as_deref()
        .ok_or_else(|| CoreError::Validation("No password is set for this account".into()))?;
    let current_valid = verify_password(&input.current_password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    state
        .store
        .update_identity(
            user.identity_id,
            IdentityPatch {
                password_hash: Some(new_hash),
                ..IdentityPatch::default()
            },
        )
        .await?;

    Ok(Json(json!({ "message": "Password updated" })))
}

/// PUT /api/v1/admin/settings/notifications
///
/// Fixed-shape settings object; omitted fields fall back to defaults.
pub async fn update_notification_settings(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(settings): Json<NotificationSettings>,
) -> AppResult<Json<NotificationSettings>> {
    let identity = state
        .store
        .update_identity(
            user.identity_id,
            IdentityPatch {
                notification_settings: Some(settings),
                ..IdentityPatch::default()
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Identity",
            id: user.identity_id,
        })?;
    Ok(Json(identity.notification_settings))
}

/// PUT /api/v1/admin/settings/security
pub async fn update_security_settings(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(settings): Json<SecuritySettings>,
) -> AppResult<Json<SecuritySettings>> {
    let identity = state
        .store
        .update_identity(
            user.identity_id,
            IdentityPatch {
                security_settings: Some(settings),
                ..IdentityPatch::default()
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Identity",
            id: user.identity_id,
        })?;
    Ok(Json(identity.security_settings))
}
