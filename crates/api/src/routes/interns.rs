//! Route definitions for the `/interns` resource (all admin-only).

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::interns;
use crate::state::AppState;

/// Routes mounted at `/interns`.
///
/// Static segments (`/past`) are registered alongside `/{id}`; axum routes
/// them by specificity.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create (fans tasks out into projects)
/// GET    /past                -> list_past
/// GET    /past/{id}           -> get_past (snapshot + stats)
/// GET    /{id}                -> get
/// PUT    /{id}                -> update (task-diff fan-out)
/// DELETE /{id}                -> archive
/// PUT    /{id}/credentials    -> update_credentials
/// POST   /{id}/attendance     -> record_attendance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(interns::list).post(interns::create))
        .route("/past", get(interns::list_past))
        .route("/past/{id}", get(interns::get_past))
        .route(
            "/{id}",
            get(interns::get)
                .put(interns::update)
                .delete(interns::archive),
        )
        .route("/{id}/credentials", put(interns::update_credentials))
        .route("/{id}/attendance", post(interns::record_attendance))
}
