//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use internhub_core::error::CoreError;
use internhub_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// A missing or malformed header is `Unauthenticated`; a well-formed token
/// that fails signature or expiry checks is `InvalidCredential`. Both map to
/// 401, but the machine-readable codes differ so clients can distinguish
/// "log in" from "token expired, refresh your session".
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The identity's internal database id (from `claims.sub`).
    pub identity_id: DbId,
    /// The identity's role name (`"student"` or `"admin"`).
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthenticated(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthenticated(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::InvalidCredential(
                "Invalid or expired token".into(),
            ))
        })?;

        Ok(AuthUser {
            identity_id: claims.sub,
            role: claims.role,
        })
    }
}
