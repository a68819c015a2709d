pub mod admin;
pub mod auth;
pub mod health;
pub mod interns;
pub mod projects;
pub mod students;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                          self-registration (public)
/// /auth/login                             login (public)
/// /auth/verify                            token introspection (auth)
///
/// /admin/registrations                    pending pool (admin only)
/// /admin/registrations/{id}/approve       approve -> identity
/// /admin/registrations/{id}/reject        reject -> delete
/// /admin/students                         roster, no password hashes
/// /admin/students/{id}                    single student
/// /admin/students/{id}/attendance         merged list (GET), record (POST)
/// /admin/progress-updates                 all students' updates, newest first
/// /admin/progress-updates/{id}/feedback   attach feedback
/// /admin/profile                          own profile (GET, PUT)
/// /admin/password                         change password (PUT)
/// /admin/settings/notifications           fixed-shape settings (PUT)
/// /admin/settings/security                fixed-shape settings (PUT)
///
/// /projects                               list (auth), create (admin)
/// /projects/{id}                          get (assignee or admin), update, delete
/// /projects/{id}/feedback                 append feedback entry (admin)
///
/// /interns                                merged views, create (admin only)
/// /interns/past                           archived snapshots
/// /interns/past/{id}                      snapshot detail + stats
/// /interns/{id}                           view, update, archive (DELETE)
/// /interns/{id}/credentials               credential rotation (PUT)
/// /interns/{id}/attendance                record attendance (POST)
///
/// /students/me                            own profile + projects (GET, PUT)
/// /students/me/progress                   own updates (GET), submit (POST)
/// /students/me/projects/{id}/progress     progress against a project (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/projects", projects::router())
        .nest("/interns", interns::router())
        .nest("/students", students::router())
}
