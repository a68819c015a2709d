//! Route definitions for the `/projects` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                -> list (auth; students see their own)
/// POST   /                -> create (admin)
/// GET    /{id}            -> get (admin or assignee)
/// PUT    /{id}            -> update (admin)
/// DELETE /{id}            -> delete (admin)
/// POST   /{id}/feedback   -> add_feedback (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route(
            "/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/{id}/feedback", post(projects::add_feedback))
}
