use std::sync::Arc;

use internhub_core::store::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; both fields are behind `Arc`. The store is injected as
/// a trait object so the binary can pick the relational or in-memory backend
/// at startup and tests can swap in the in-memory one.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
}
