//! The unified login-capable account record (student or admin).
//!
//! Interns are not a separate entity: an identity with an [`Employment`]
//! sub-record is a current intern. Read views over interns are computed by
//! the lifecycle service, not stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::attendance::AttendanceEntry;
use crate::models::progress::ProgressUpdate;
use crate::types::{DbId, Timestamp};

/// Fixed-shape notification preferences with portal-wide defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub attendance_alerts: bool,
    pub project_updates: bool,
    pub system_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            attendance_alerts: true,
            project_updates: true,
            system_alerts: true,
        }
    }
}

/// Fixed-shape security preferences with portal-wide defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub two_factor_auth: bool,
    pub require_password_reset: bool,
    /// Session timeout in minutes.
    pub session_timeout: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_auth: false,
            require_password_reset: false,
            session_timeout: 30,
        }
    }
}

/// The operational/HR view of an internship engagement, folded into the
/// identity as an optional sub-record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employment {
    pub joining_date: Timestamp,
    pub end_date: Option<Timestamp>,
    /// Internship duration in months.
    pub duration_months: i32,
    /// Completion percentage, recomputed on progress submission.
    pub progress_pct: i32,
    pub project_rating: i32,
    /// Engagement status, e.g. `"Active"`.
    pub status: String,
    /// Canonical task-name list; each name fans out into a project.
    pub tasks: Vec<String>,
}

impl Employment {
    /// A fresh engagement starting now.
    pub fn starting_now(now: Timestamp, duration_months: i32, tasks: Vec<String>) -> Self {
        Self {
            joining_date: now,
            end_date: None,
            duration_months,
            progress_pct: 0,
            project_rating: 0,
            status: "Active".to_string(),
            tasks,
        }
    }
}

/// A login-capable account record with profile, employment, and the
/// append-only attendance/progress sequences.
///
/// The password hash is never serialized; API responses expose everything
/// else directly.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// Absent until credentials are provisioned (e.g. intern created without
    /// a login, pending credential rotation).
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    pub contact_number: Option<String>,
    pub program: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    /// Stored-location reference from the file collaborator; never raw bytes.
    pub resume_link: Option<String>,
    pub profile_picture: Option<String>,
    /// Free-form profile attributes (skills, department, domain, ...).
    pub attributes: BTreeMap<String, String>,
    pub employment: Option<Employment>,
    /// Owned-by-reference project ids, in assignment order.
    pub assigned_projects: Vec<DbId>,
    pub attendance: Vec<AttendanceEntry>,
    pub progress_updates: Vec<ProgressUpdate>,
    pub notification_settings: NotificationSettings,
    pub security_settings: SecuritySettings,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub last_active: Timestamp,
    pub last_login: Option<Timestamp>,
}

impl Identity {
    /// Whether this identity is a live intern engagement.
    pub fn is_current_intern(&self) -> bool {
        self.is_active && self.employment.is_some()
    }
}

/// Input for inserting an identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: String,
    pub contact_number: Option<String>,
    pub program: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub resume_link: Option<String>,
    pub profile_picture: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub employment: Option<Employment>,
}

impl NewIdentity {
    /// A bare student identity with defaults for everything but the
    /// name/email pair.
    pub fn student(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            username: None,
            password_hash: None,
            role: crate::roles::ROLE_STUDENT.to_string(),
            contact_number: None,
            program: None,
            university: None,
            graduation_year: None,
            bio: None,
            resume_link: None,
            profile_picture: None,
            attributes: BTreeMap::new(),
            employment: None,
        }
    }
}

/// Partial update for an identity. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub contact_number: Option<String>,
    pub program: Option<String>,
    pub university: Option<String>,
    pub graduation_year: Option<i32>,
    pub bio: Option<String>,
    pub resume_link: Option<String>,
    pub profile_picture: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
    pub employment: Option<Employment>,
    pub notification_settings: Option<NotificationSettings>,
    pub security_settings: Option<SecuritySettings>,
}
