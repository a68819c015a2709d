//! Route definitions for the `/students/me` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::students;
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// GET  /me                        -> me (profile + assigned projects)
/// PUT  /me                        -> update_me
/// POST /me/attendance             -> report_attendance
/// GET  /me/progress               -> my_progress
/// POST /me/progress               -> submit_progress
/// POST /me/projects/{id}/progress -> submit_project_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(students::me).put(students::update_me))
        .route("/me/attendance", post(students::report_attendance))
        .route(
            "/me/progress",
            get(students::my_progress).post(students::submit_progress),
        )
        .route(
            "/me/projects/{id}/progress",
            post(students::submit_project_progress),
        )
}
