//! HTTP-level integration tests for project CRUD, assignment-scoped
//! visibility, and feedback.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, delete_auth, get_auth, post_json_auth, put_json_auth,
    seed_admin, seed_student,
};
use internhub_db::MemoryStore;

/// Create a project through the API and return its JSON.
async fn create_project(
    store: &Arc<MemoryStore>,
    admin_token: &str,
    title: &str,
    assigned_to: serde_json::Value,
) -> serde_json::Value {
    let response = post_json_auth(
        build_test_app(store.clone()),
        "/api/v1/projects",
        admin_token,
        serde_json::json!({
            "title": title,
            "description": format!("{title} description"),
            "assigned_to": assigned_to,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn created_projects_start_not_started() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let project = create_project(&store, &admin_token, "Fresh", serde_json::json!([])).await;
    assert_eq!(project["status"], "Not Started");
    assert_eq!(project["created_by"], "admin");
    assert_eq!(project["feedback"], serde_json::json!([]));
}

#[tokio::test]
async fn create_requires_a_title() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let response = post_json_auth(
        build_test_app(store),
        "/api/v1/projects",
        &admin_token,
        serde_json::json!({ "title": "   ", "description": "untitled" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

/// Students only see and open the projects assigned to them; admins see
/// everything.
#[tokio::test]
async fn visibility_is_scoped_by_assignment() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;
    let (assignee_id, assignee_token) = seed_student(&store, "Assignee", "assignee").await;
    let (_, outsider_token) = seed_student(&store, "Outsider", "outsider").await;

    let mine = create_project(
        &store,
        &admin_token,
        "Mine",
        serde_json::json!([assignee_id]),
    )
    .await;
    create_project(&store, &admin_token, "Not mine", serde_json::json!([])).await;
    let project_id = mine["id"].as_i64().unwrap();

    // Admin list: both projects.
    let response = get_auth(build_test_app(store.clone()), "/api/v1/projects", &admin_token).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    // Assignee list: only the assigned one.
    let response = get_auth(
        build_test_app(store.clone()),
        "/api/v1/projects",
        &assignee_token,
    )
    .await;
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Mine");

    // Assignee can open it; an unassigned student cannot.
    let response = get_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &assignee_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        build_test_app(store),
        &format!("/api/v1/projects/{project_id}"),
        &outsider_token,
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

/// Admin status updates are permissive: any status value may be set, and
/// every update refreshes `last_modified`.
#[tokio::test]
async fn update_sets_status_and_bumps_last_modified() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let project = create_project(&store, &admin_token, "Status", serde_json::json!([])).await;
    let project_id = project["id"].as_i64().unwrap();

    let response = put_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &admin_token,
        serde_json::json!({ "status": "Under Review" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["status"], "Under Review");

    let before: chrono::DateTime<chrono::Utc> =
        project["last_modified"].as_str().unwrap().parse().unwrap();
    let after: chrono::DateTime<chrono::Utc> =
        updated["last_modified"].as_str().unwrap().parse().unwrap();
    assert!(after > before, "update must advance last_modified");
}

#[tokio::test]
async fn feedback_is_append_only() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let project = create_project(&store, &admin_token, "Reviewed", serde_json::json!([])).await;
    let project_id = project["id"].as_i64().unwrap();

    for comment in ["First pass looks good", "Second pass, ship it"] {
        let response = post_json_auth(
            build_test_app(store.clone()),
            &format!("/api/v1/projects/{project_id}/feedback"),
            &admin_token,
            serde_json::json!({ "comment": comment }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(
        build_test_app(store),
        &format!("/api/v1/projects/{project_id}"),
        &admin_token,
    )
    .await;
    let project = body_json(response).await;
    let feedback = project["feedback"].as_array().unwrap();
    assert_eq!(feedback.len(), 2);
    assert_eq!(feedback[0]["comment"], "First pass looks good");
    assert_eq!(feedback[0]["from"], "admin");
    assert_eq!(feedback[1]["comment"], "Second pass, ship it");
}

#[tokio::test]
async fn delete_removes_the_project_and_its_assignments() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;
    let (student_id, student_token) = seed_student(&store, "Loser", "loser").await;

    let project = create_project(
        &store,
        &admin_token,
        "Doomed",
        serde_json::json!([student_id]),
    )
    .await;
    let project_id = project["id"].as_i64().unwrap();

    let response = delete_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // A second delete is a 404, and the student's list is empty again.
    let response = delete_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &admin_token,
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let response = get_auth(build_test_app(store), "/api/v1/projects", &student_token).await;
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn mutations_are_admin_only() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;
    let (student_id, student_token) = seed_student(&store, "Student", "student1").await;

    let project = create_project(
        &store,
        &admin_token,
        "Locked",
        serde_json::json!([student_id]),
    )
    .await;
    let project_id = project["id"].as_i64().unwrap();

    let response = put_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/projects/{project_id}"),
        &student_token,
        serde_json::json!({ "status": "Completed" }),
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let response = delete_auth(
        build_test_app(store),
        &format!("/api/v1/projects/{project_id}"),
        &student_token,
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}
