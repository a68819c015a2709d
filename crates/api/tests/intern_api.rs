//! HTTP-level integration tests for the admin intern lifecycle: creation
//! with task fan-out, task diffing on update, credential rotation, and the
//! archive transition.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, delete_auth, get_auth, post_json, post_json_auth,
    put_json_auth, seed_admin, TEST_PASSWORD,
};
use internhub_db::MemoryStore;

/// Create an intern through the API and return the view JSON.
async fn create_intern(
    store: &Arc<MemoryStore>,
    admin_token: &str,
    name: &str,
    email: &str,
    tasks: serde_json::Value,
) -> serde_json::Value {
    let response = post_json_auth(
        build_test_app(store.clone()),
        "/api/v1/interns",
        admin_token,
        serde_json::json!({ "name": name, "email": email, "tasks": tasks }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// A comma-delimited task string fans out into one project per name, each
/// assigned to the new intern, and the view surfaces the "Not available"
/// sentinel for the unprovisioned username.
#[tokio::test]
async fn create_intern_fans_tasks_out_into_projects() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let view = create_intern(
        &store,
        &admin_token,
        "Task Intern",
        "tasks@uni.test",
        serde_json::json!("Data pipeline, Admin dashboard"),
    )
    .await;
    assert_eq!(view["username"], "Not available");
    assert_eq!(view["progress_pct"], 0);
    assert_eq!(
        view["tasks"],
        serde_json::json!(["Data pipeline", "Admin dashboard"])
    );
    assert_eq!(view["assigned_projects"].as_array().unwrap().len(), 2);

    let response = get_auth(build_test_app(store), "/api/v1/projects", &admin_token).await;
    let projects = body_json(response).await;
    let titles: Vec<&str> = projects
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Data pipeline"));
    assert!(titles.contains(&"Admin dashboard"));
    for project in projects.as_array().unwrap() {
        assert_eq!(project["status"], "Not Started");
        assert_eq!(project["assigned_to"], serde_json::json!([view["id"]]));
    }
}

/// Updating with an overlapping task list creates projects only for the new
/// names; dropping a name never deletes its project.
#[tokio::test]
async fn update_intern_diffs_the_task_list() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let view = create_intern(
        &store,
        &admin_token,
        "Diff Intern",
        "diff@uni.test",
        serde_json::json!(["Alpha", "Beta"]),
    )
    .await;
    let id = view["id"].as_i64().unwrap();

    // "Beta" is dropped, "Gamma" is new; only "Gamma" fans out.
    let response = put_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/interns/{id}"),
        &admin_token,
        serde_json::json!({ "tasks": ["Alpha", "Gamma"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["tasks"], serde_json::json!(["Alpha", "Gamma"]));
    assert_eq!(updated["assigned_projects"].as_array().unwrap().len(), 3);

    let response = get_auth(build_test_app(store), "/api/v1/projects", &admin_token).await;
    let projects = body_json(response).await;
    assert_eq!(projects.as_array().unwrap().len(), 3);
}

/// Credential rotation provisions a login the intern can immediately use.
#[tokio::test]
async fn rotated_credentials_can_log_in() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let view = create_intern(
        &store,
        &admin_token,
        "Login Intern",
        "login-intern@uni.test",
        serde_json::json!([]),
    )
    .await;
    let id = view["id"].as_i64().unwrap();

    let response = put_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/interns/{id}/credentials"),
        &admin_token,
        serde_json::json!({ "username": "rotated", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        build_test_app(store),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": "rotated", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let auth = body_json(response).await;
    assert_eq!(auth["user"]["id"], id);
}

#[tokio::test]
async fn credential_rotation_rejects_a_taken_username() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let view = create_intern(
        &store,
        &admin_token,
        "Conflict Intern",
        "conflict@uni.test",
        serde_json::json!([]),
    )
    .await;
    let id = view["id"].as_i64().unwrap();

    // "admin" is held by the seeded admin account.
    let response = put_json_auth(
        build_test_app(store),
        &format!("/api/v1/interns/{id}/credentials"),
        &admin_token,
        serde_json::json!({ "username": "admin" }),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

/// Recorded attendance shows up in the merged intern view, newest first.
#[tokio::test]
async fn recorded_attendance_appears_in_the_view() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let view = create_intern(
        &store,
        &admin_token,
        "Present Intern",
        "present@uni.test",
        serde_json::json!([]),
    )
    .await;
    let id = view["id"].as_i64().unwrap();

    for (date, status) in [
        ("2024-03-01T09:00:00Z", "Present"),
        ("2024-03-02T09:30:00Z", "Late"),
    ] {
        let response = post_json_auth(
            build_test_app(store.clone()),
            &format!("/api/v1/interns/{id}/attendance"),
            &admin_token,
            serde_json::json!({ "date": date, "status": status, "time_in": "09:00" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        build_test_app(store),
        &format!("/api/v1/interns/{id}"),
        &admin_token,
    )
    .await;
    let view = body_json(response).await;
    let attendance = view["attendance"].as_array().unwrap();
    assert_eq!(attendance.len(), 2);
    // Newest first.
    assert_eq!(attendance[0]["status"], "Late");
    assert_eq!(attendance[1]["status"], "Present");
}

/// Archiving returns the snapshot, releases the projects, and removes the
/// intern from all lifecycle reads; the snapshot remains queryable with
/// derived stats.
#[tokio::test]
async fn archive_retires_the_intern_into_a_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let view = create_intern(
        &store,
        &admin_token,
        "Archived Intern",
        "archived@uni.test",
        serde_json::json!(["Final report"]),
    )
    .await;
    let id = view["id"].as_i64().unwrap();

    let response = delete_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/interns/{id}"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["source_intern_id"], id);
    assert_eq!(snapshot["deleted_projects"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["deleted_projects"][0]["title"], "Final report");
    let snapshot_id = snapshot["id"].as_i64().unwrap();

    // Gone from the current roster.
    let response = get_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/interns/{id}"),
        &admin_token,
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let response = get_auth(build_test_app(store.clone()), "/api/v1/interns", &admin_token).await;
    assert_eq!(body_json(response).await, serde_json::json!([]));

    // The project survives, unassigned.
    let response = get_auth(build_test_app(store.clone()), "/api/v1/projects", &admin_token).await;
    let projects = body_json(response).await;
    assert_eq!(projects.as_array().unwrap().len(), 1);
    assert_eq!(projects[0]["assigned_to"], serde_json::json!([]));

    // Snapshot detail carries derived stats.
    let response = get_auth(
        build_test_app(store),
        &format!("/api/v1/interns/past/{snapshot_id}"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["name"], "Archived Intern");
    assert_eq!(detail["stats"]["total_projects"], 1);
    assert_eq!(detail["stats"]["completed_projects"], 0);
}

#[tokio::test]
async fn create_intern_requires_name_and_email() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let response = post_json_auth(
        build_test_app(store),
        "/api/v1/interns",
        &admin_token,
        serde_json::json!({ "name": "  ", "email": "blank@uni.test", "tasks": [] }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}
