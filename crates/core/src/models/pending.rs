//! Self-registered accounts awaiting admin approval.
//!
//! A pending record mirrors the registration subset of an identity. A given
//! email or username may exist in at most one of the identity store and the
//! pending pool at a time.

use serde::Serialize;

use crate::models::identity::{NotificationSettings, SecuritySettings};
use crate::types::{DbId, Timestamp};

/// A registration request held until an admin approves or rejects it.
#[derive(Debug, Clone, Serialize)]
pub struct PendingStudent {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub contact_number: Option<String>,
    pub program: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub notification_settings: NotificationSettings,
    pub security_settings: SecuritySettings,
    pub created_at: Timestamp,
}

/// Input for queuing a registration request. The password is hashed by the
/// caller before it gets here; plaintext is never stored or logged.
#[derive(Debug, Clone)]
pub struct NewPendingStudent {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub contact_number: Option<String>,
    pub program: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
}
