#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use internhub_api::auth::jwt::{generate_access_token, JwtConfig};
use internhub_api::auth::password::hash_password;
use internhub_api::config::ServerConfig;
use internhub_api::router::build_app_router;
use internhub_api::state::AppState;
use internhub_core::models::NewIdentity;
use internhub_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use internhub_core::store::Store;
use internhub_core::types::DbId;
use internhub_db::MemoryStore;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a fixed JWT secret so tokens can be minted outside the login flow.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        archive_cascade_delete: false,
        jwt: JwtConfig {
            secret: "integration-test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router over an in-memory store.
///
/// This goes through [`build_app_router`] so integration tests exercise the
/// same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Fixed plaintext password for seeded accounts. Argon2 hashing is slow, so
/// tests seed a handful of accounts per scenario rather than dozens.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Seed an admin identity directly in the store and return its id plus a
/// valid access token.
pub async fn seed_admin(store: &MemoryStore) -> (DbId, String) {
    let identity = store
        .insert_identity(NewIdentity {
            username: Some("admin".to_string()),
            password_hash: Some(hash_password(TEST_PASSWORD).expect("hashing should succeed")),
            role: ROLE_ADMIN.to_string(),
            ..NewIdentity::student("Portal Admin", "admin@portal.test")
        })
        .await
        .expect("admin seeding should succeed");
    let token = generate_access_token(identity.id, ROLE_ADMIN, &test_config().jwt)
        .expect("token generation should succeed");
    (identity.id, token)
}

/// Seed a student identity with credentials and return its id plus a valid
/// access token.
pub async fn seed_student(store: &MemoryStore, name: &str, username: &str) -> (DbId, String) {
    let identity = store
        .insert_identity(NewIdentity {
            username: Some(username.to_string()),
            password_hash: Some(hash_password(TEST_PASSWORD).expect("hashing should succeed")),
            ..NewIdentity::student(name, &format!("{username}@portal.test"))
        })
        .await
        .expect("student seeding should succeed");
    let token = generate_access_token(identity.id, ROLE_STUDENT, &test_config().jwt)
        .expect("token generation should succeed");
    (identity.id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("request should not fail")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert an error response: status code plus the `code` field of the
/// standard `{"error": ..., "code": ...}` body.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error code: {json}");
    assert!(json["error"].is_string(), "error body must carry a message");
}
