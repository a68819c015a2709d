//! HTTP-level integration tests for registration, login, and the auth
//! middleware: the full register -> approve -> login journey plus the
//! 401/403 taxonomy.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, get, get_auth, post_json, post_json_auth, seed_admin,
    seed_student, test_config, TEST_PASSWORD,
};
use internhub_api::auth::jwt::{generate_access_token, JwtConfig};
use internhub_core::roles::ROLE_STUDENT;
use internhub_db::MemoryStore;

fn register_body(name: &str, email: &str, username: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "email": email,
        "username": username,
        "password": TEST_PASSWORD,
    })
}

/// The full onboarding journey: a self-registration sits in the pending
/// pool and cannot log in; after admin approval the same credentials work
/// and the token passes verification.
#[tokio::test]
async fn register_approve_login_journey() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    // Register.
    let response = post_json(
        build_test_app(store.clone()),
        "/api/v1/auth/register",
        register_body("Jane Doe", "jane@uni.test", "jdoe"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let pending = body_json(response).await;
    assert_eq!(pending["username"], "jdoe");
    assert!(
        pending.get("password_hash").is_none(),
        "password hash must never be serialized"
    );
    let pending_id = pending["id"].as_i64().unwrap();

    // Login is gated while the registration is pending.
    let response = post_json(
        build_test_app(store.clone()),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": "jdoe", "password": TEST_PASSWORD }),
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    // Approve.
    let response = post_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/registrations/{pending_id}/approve"),
        &admin_token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let identity = body_json(response).await;
    assert_eq!(identity["role"], "student");
    assert_eq!(identity["username"], "jdoe");

    // The pending pool is drained.
    let response = get_auth(
        build_test_app(store.clone()),
        "/api/v1/admin/registrations",
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));

    // Login now succeeds, by username or by email.
    let response = post_json(
        build_test_app(store.clone()),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": "jane@uni.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let auth = body_json(response).await;
    assert!(auth["token"].is_string());
    assert!(auth["expires_in"].is_number());
    assert_eq!(auth["user"]["username"], "jdoe");
    assert_eq!(auth["user"]["role"], "student");

    // The issued token passes verification.
    let token = auth["token"].as_str().unwrap();
    let response = get_auth(build_test_app(store), "/api/v1/auth/verify", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["role"], "student");
}

#[tokio::test]
async fn register_rejects_a_short_password() {
    let store = Arc::new(MemoryStore::new());
    let response = post_json(
        build_test_app(store),
        "/api/v1/auth/register",
        serde_json::json!({
            "name": "Short",
            "email": "short@uni.test",
            "username": "short",
            "password": "short",
        }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn register_conflicts_with_an_existing_account() {
    let store = Arc::new(MemoryStore::new());
    seed_student(&store, "Taken", "taken").await;

    let response = post_json(
        build_test_app(store),
        "/api/v1/auth/register",
        register_body("Someone Else", "else@uni.test", "taken"),
    )
    .await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[tokio::test]
async fn rejected_registration_cannot_log_in() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let response = post_json(
        build_test_app(store.clone()),
        "/api/v1/auth/register",
        register_body("Rejected", "rejected@uni.test", "rejected"),
    )
    .await;
    let pending_id = body_json(response).await["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(store.clone()),
        &format!("/api/v1/admin/registrations/{pending_id}/reject"),
        &admin_token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // No longer pending and never became an identity.
    let response = post_json(
        build_test_app(store),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": "rejected", "password": TEST_PASSWORD }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn login_with_a_wrong_password_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    seed_student(&store, "Login User", "loginuser").await;

    let response = post_json(
        build_test_app(store),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": "loginuser", "password": "incorrect_password" }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

/// An intern created without a login is findable by email but carries no
/// password hash; login is refused cleanly, not a server error.
#[tokio::test]
async fn login_without_provisioned_credentials_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    let (_, admin_token) = seed_admin(&store).await;

    let response = post_json_auth(
        build_test_app(store.clone()),
        "/api/v1/interns",
        &admin_token,
        serde_json::json!({ "name": "No Login", "email": "nologin@uni.test" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        build_test_app(store),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": "nologin@uni.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn login_with_an_unknown_identifier_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    let response = post_json(
        build_test_app(store),
        "/api/v1/auth/login",
        serde_json::json!({ "identifier": "ghost", "password": "whatever_pw" }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

/// The three authentication failure modes carry distinct codes: no token,
/// a bad token, and a valid token with the wrong role.
#[tokio::test]
async fn auth_failure_taxonomy() {
    let store = Arc::new(MemoryStore::new());
    let (_, student_token) = seed_student(&store, "Plain Student", "plain").await;

    // Missing Authorization header.
    let response = get(build_test_app(store.clone()), "/api/v1/admin/students").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHENTICATED").await;

    // Garbage token.
    let response = get_auth(
        build_test_app(store.clone()),
        "/api/v1/admin/students",
        "not-a-jwt",
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIAL").await;

    // Expired token.
    let expired_config = JwtConfig {
        access_token_expiry_mins: -10,
        ..test_config().jwt
    };
    let expired = generate_access_token(1, ROLE_STUDENT, &expired_config).unwrap();
    let response = get_auth(build_test_app(store.clone()), "/api/v1/auth/verify", &expired).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIAL").await;

    // Valid student token on an admin route.
    let response = get_auth(
        build_test_app(store),
        "/api/v1/admin/students",
        &student_token,
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let store = Arc::new(MemoryStore::new());
    let response = get(build_test_app(store), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store_healthy"], true);
    assert!(json["version"].is_string());
}
