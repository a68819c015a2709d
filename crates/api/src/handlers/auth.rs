//! Handlers for the `/auth` resource (register, login, verify).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use internhub_core::error::CoreError;
use internhub_core::models::{NewPendingStudent, PendingStudent};
use internhub_core::registration;
use internhub_core::types::DbId;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub contact_number: Option<String>,
    pub program: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
}

/// Request body for `POST /auth/login`. The identifier may be a username or
/// an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public identity info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Queue a self-service registration for admin approval. The account cannot
/// log in until approved.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PendingStudent>)> {
    for (field, value) in [
        ("name", &input.name),
        ("email", &input.email),
        ("username", &input.username),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{field} is required"
            ))));
        }
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let pending = registration::register(
        state.store.as_ref(),
        NewPendingStudent {
            name: input.name,
            email: input.email,
            username: input.username,
            password_hash,
            contact_number: input.contact_number,
            program: input.program,
            university: input.university,
            graduation_year: input.graduation_year,
            bio: input.bio,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(pending)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username-or-email plus password. A pending registration
/// is rejected with 403 before any password check.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let identity = registration::login_candidate(state.store.as_ref(), &input.identifier).await?;

    // login_candidate filters hash-less identities, but an account with no
    // credential is never verifiable either way.
    let hash = identity.password_hash.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Invalid credentials".to_string()))
    })?;
    let password_valid = verify(&input.password, hash)?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid credentials".into(),
        )));
    }

    state.store.record_login(identity.id).await?;

    let token = generate_access_token(identity.id, &identity.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            username: identity.username,
            role: identity.role,
        },
    }))
}

fn verify(password: &str, hash: &str) -> AppResult<bool> {
    crate::auth::password::verify_password(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))
}

/// GET /api/v1/auth/verify
///
/// Token introspection: succeeds iff the presented token is valid.
pub async fn verify_token(user: AuthUser) -> AppResult<Json<serde_json::Value>> {
    Ok(Json(json!({
        "valid": true,
        "identity_id": user.identity_id,
        "role": user.role,
    })))
}
