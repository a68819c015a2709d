//! Role name constants.
//!
//! The portal has exactly two roles; admin-gated operations compare against
//! [`ROLE_ADMIN`] and reject everything else with `Forbidden`.

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_ADMIN: &str = "admin";
