//! Progress updates: append-only, owned by one identity.
//!
//! Entries are never edited after the fact except for the one-shot admin
//! feedback attachment, which sets `feedback`, `feedback_date` and flips
//! `has_admin_feedback`.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// A single progress update submitted by (or on behalf of) an intern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub id: DbId,
    pub content: String,
    pub timestamp: Timestamp,
    pub feedback: Option<String>,
    pub feedback_date: Option<Timestamp>,
    pub has_admin_feedback: bool,
}

/// Input for submitting a progress update. `timestamp` defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProgressUpdate {
    pub content: String,
    pub timestamp: Option<Timestamp>,
}
