//! HTTP layer for the internship-management portal.
//!
//! Thin axum surface over the `internhub_core` services. Handlers hold no
//! business logic beyond request/response shaping; workflows live in the core
//! crate and persistence behind the `Store` trait.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
