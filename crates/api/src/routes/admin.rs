//! Route definitions for the `/admin` resource. Admin-only, except the
//! attendance read, which a student may call for their own record.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /registrations                 -> list_registrations
/// POST /registrations/{id}/approve    -> approve_registration
/// POST /registrations/{id}/reject     -> reject_registration
/// GET  /students                      -> list_students
/// GET  /students/{id}                 -> get_student
/// GET  /students/{id}/attendance      -> get_student_attendance (admin or self)
/// POST /students/{id}/attendance      -> record_student_attendance
/// GET  /progress-updates              -> list_progress_updates
/// POST /progress-updates/{id}/feedback-> progress_feedback
/// GET  /profile                       -> get_profile
/// PUT  /profile                       -> update_profile
/// PUT  /password                      -> change_password
/// PUT  /settings/notifications        -> update_notification_settings
/// PUT  /settings/security             -> update_security_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/registrations", get(admin::list_registrations))
        .route(
            "/registrations/{id}/approve",
            post(admin::approve_registration),
        )
        .route(
            "/registrations/{id}/reject",
            post(admin::reject_registration),
        )
        .route("/students", get(admin::list_students))
        .route("/students/{id}", get(admin::get_student))
        .route(
            "/students/{id}/attendance",
            get(admin::get_student_attendance).post(admin::record_student_attendance),
        )
        .route("/progress-updates", get(admin::list_progress_updates))
        .route(
            "/progress-updates/{id}/feedback",
            post(admin::progress_feedback),
        )
        .route(
            "/profile",
            get(admin::get_profile).put(admin::update_profile),
        )
        .route("/password", put(admin::change_password))
        .route(
            "/settings/notifications",
            put(admin::update_notification_settings),
        )
        .route("/settings/security", put(admin::update_security_settings))
}
