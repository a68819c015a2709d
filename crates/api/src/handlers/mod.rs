//! Request handlers, grouped by resource.

pub mod admin;
pub mod auth;
pub mod interns;
pub mod projects;
pub mod students;
