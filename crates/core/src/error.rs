use crate::types::DbId;

/// Domain error taxonomy shared by all services and store backends.
///
/// Every variant carries a human-readable message; the API layer maps each
/// variant to a stable machine-readable code and HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// No credential was presented, or it was too malformed to inspect.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// A credential was presented but is expired or fails signature checks.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Login rejected: unknown account or wrong password.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed: insufficient role, or the
    /// pending-registration login gate.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the core and store layers.
pub type CoreResult<T> = Result<T, CoreError>;
