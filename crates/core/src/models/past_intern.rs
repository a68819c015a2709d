//! Immutable archival snapshots of ended internship engagements.

use serde::{Deserialize, Serialize};

use crate::models::attendance::{AttendanceEntry, AttendanceStatus};
use crate::models::progress::ProgressUpdate;
use crate::models::project::ProjectStatus;
use crate::types::{DbId, Timestamp};

/// A frozen `{title, description, status}` copy of a project as it existed
/// when its intern was archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
}

/// Terminal snapshot created by the archive transition. Once written it is
/// never mutated; there is no un-delete path.
#[derive(Debug, Clone, Serialize)]
pub struct PastIntern {
    pub id: DbId,
    /// Identity id the snapshot was taken from. Unique: retrying a
    /// partially-failed archive never duplicates the snapshot.
    pub source_intern_id: DbId,
    pub name: String,
    pub email: String,
    pub joining_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub duration_months: i32,
    pub progress_pct: i32,
    pub tasks: Vec<String>,
    /// Merged attendance sequence, newest first, frozen at archive time.
    pub attendance: Vec<AttendanceEntry>,
    /// Merged progress sequence, newest first, frozen at archive time.
    pub progress_updates: Vec<ProgressUpdate>,
    pub status: String,
    pub deleted_at: Timestamp,
    pub deleted_projects: Vec<ProjectSnapshot>,
}

/// Input for inserting an archival snapshot. Field-for-field the same as
/// [`PastIntern`] minus the store-assigned id.
#[derive(Debug, Clone)]
pub struct NewPastIntern {
    pub source_intern_id: DbId,
    pub name: String,
    pub email: String,
    pub joining_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub duration_months: i32,
    pub progress_pct: i32,
    pub tasks: Vec<String>,
    pub attendance: Vec<AttendanceEntry>,
    pub progress_updates: Vec<ProgressUpdate>,
    pub status: String,
    pub deleted_at: Timestamp,
    pub deleted_projects: Vec<ProjectSnapshot>,
}

impl NewPastIntern {
    /// Attach a store-assigned id, producing the stored form.
    pub fn into_past_intern(self, id: DbId) -> PastIntern {
        PastIntern {
            id,
            source_intern_id: self.source_intern_id,
            name: self.name,
            email: self.email,
            joining_date: self.joining_date,
            end_date: self.end_date,
            duration_months: self.duration_months,
            progress_pct: self.progress_pct,
            tasks: self.tasks,
            attendance: self.attendance,
            progress_updates: self.progress_updates,
            status: self.status,
            deleted_at: self.deleted_at,
            deleted_projects: self.deleted_projects,
        }
    }
}

/// Derived summary returned with a past-intern detail view.
#[derive(Debug, Clone, Serialize)]
pub struct PastInternStats {
    pub completed_projects: usize,
    pub total_projects: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub total_attendance: usize,
}

impl PastInternStats {
    pub fn for_snapshot(snapshot: &PastIntern) -> Self {
        let count = |status: AttendanceStatus| {
            snapshot
                .attendance
                .iter()
                .filter(|a| a.status == status)
                .count()
        };
        Self {
            completed_projects: snapshot
                .deleted_projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count(),
            total_projects: snapshot.deleted_projects.len(),
            present: count(AttendanceStatus::Present),
            absent: count(AttendanceStatus::Absent),
            late: count(AttendanceStatus::Late),
            total_attendance: snapshot.attendance.len(),
        }
    }
}
