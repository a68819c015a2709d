//! The persistence collaborator.
//!
//! The workflow services are written once against [`Store`]; concrete
//! backends (relational via sqlx, document-style in memory) implement it in
//! `internhub-db`. The trait deliberately sticks to simple primitives --
//! point lookup, predicate lookup, insert, partial update, delete,
//! association management, atomic appends -- so it can sit over either kind
//! of store without leaking query semantics.
//!
//! Append operations are atomic at the store level (child-row insert or
//! set-union update), never read-modify-write in the service layer, so
//! concurrent updates to the same identity cannot lose an append.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::models::{
    AttendanceEntry, AttendanceSource, FeedbackEntry, Identity, IdentityPatch, NewAttendance,
    NewIdentity, NewPastIntern, NewPendingStudent, NewProgressUpdate, NewProject, PastIntern,
    PendingStudent, ProgressUpdate, Project, ProjectPatch,
};
use crate::types::{DbId, Timestamp};

/// Storage backend contract. Object-safe: handlers hold an `Arc<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    // --- Identities -------------------------------------------------------

    async fn insert_identity(&self, new: NewIdentity) -> CoreResult<Identity>;

    async fn identity(&self, id: DbId) -> CoreResult<Option<Identity>>;

    /// Point lookup by exact username.
    async fn identity_by_username(&self, username: &str) -> CoreResult<Option<Identity>>;

    /// Predicate lookup: username OR email equals `identifier`.
    async fn identity_by_login(&self, identifier: &str) -> CoreResult<Option<Identity>>;

    /// Whether any identity holds this email or username.
    async fn identity_exists(&self, email: &str, username: &str) -> CoreResult<bool>;

    /// All identities, optionally filtered by role, newest first.
    async fn list_identities(&self, role: Option<&str>) -> CoreResult<Vec<Identity>>;

    /// Apply the non-`None` fields of `patch`. Returns the updated identity,
    /// or `None` if the id does not resolve.
    async fn update_identity(&self, id: DbId, patch: IdentityPatch)
        -> CoreResult<Option<Identity>>;

    /// Mark an identity inactive. Returns `false` if it was already inactive
    /// or absent, making archival retries side-effect free.
    async fn deactivate_identity(&self, id: DbId) -> CoreResult<bool>;

    /// Stamp `last_active` and `last_login` to now.
    async fn record_login(&self, id: DbId) -> CoreResult<()>;

    /// Atomically append an attendance entry.
    async fn append_attendance(
        &self,
        identity_id: DbId,
        entry: NewAttendance,
        source: AttendanceSource,
    ) -> CoreResult<AttendanceEntry>;

    /// Atomically append a progress update.
    async fn append_progress(
        &self,
        identity_id: DbId,
        update: NewProgressUpdate,
    ) -> CoreResult<ProgressUpdate>;

    /// Locate a progress update by id, returning its owner as well.
    async fn find_progress_update(
        &self,
        update_id: DbId,
    ) -> CoreResult<Option<(DbId, ProgressUpdate)>>;

    /// Attach admin feedback to a progress update (one-shot; sets
    /// `has_admin_feedback`).
    async fn set_progress_feedback(
        &self,
        update_id: DbId,
        feedback: &str,
        at: Timestamp,
    ) -> CoreResult<Option<ProgressUpdate>>;

    // --- Projects ---------------------------------------------------------

    async fn insert_project(&self, new: NewProject) -> CoreResult<Project>;

    async fn project(&self, id: DbId) -> CoreResult<Option<Project>>;

    async fn list_projects(&self) -> CoreResult<Vec<Project>>;

    /// Projects assigned to an identity, in assignment order.
    async fn projects_for_identity(&self, identity_id: DbId) -> CoreResult<Vec<Project>>;

    /// Apply the non-`None` fields of `patch` and refresh `last_modified`.
    async fn update_project(&self, id: DbId, patch: ProjectPatch) -> CoreResult<Option<Project>>;

    /// Append a feedback entry and refresh `last_modified`.
    async fn append_project_feedback(
        &self,
        id: DbId,
        entry: FeedbackEntry,
    ) -> CoreResult<Option<Project>>;

    /// Delete a project and every assignment referencing it.
    async fn delete_project(&self, id: DbId) -> CoreResult<bool>;

    /// Add the identity to the project's assignee set (idempotent set-union).
    async fn assign_project(&self, project_id: DbId, identity_id: DbId) -> CoreResult<()>;

    /// Remove the identity from the project's assignee set.
    async fn unassign_project(&self, project_id: DbId, identity_id: DbId) -> CoreResult<()>;

    // --- Pending registrations -------------------------------------------

    async fn insert_pending(&self, new: NewPendingStudent) -> CoreResult<PendingStudent>;

    async fn pending(&self, id: DbId) -> CoreResult<Option<PendingStudent>>;

    /// Predicate lookup: username OR email equals `identifier`.
    async fn pending_by_identifier(&self, identifier: &str) -> CoreResult<Option<PendingStudent>>;

    /// Whether any pending record holds this email or username.
    async fn pending_exists(&self, email: &str, username: &str) -> CoreResult<bool>;

    async fn list_pending(&self) -> CoreResult<Vec<PendingStudent>>;

    async fn delete_pending(&self, id: DbId) -> CoreResult<bool>;

    // --- Past interns -----------------------------------------------------

    /// Insert an archival snapshot keyed by `source_intern_id`. If a snapshot
    /// for that source already exists (archive retry), the existing one is
    /// returned untouched.
    async fn insert_past_intern(&self, snapshot: NewPastIntern) -> CoreResult<PastIntern>;

    async fn past_intern(&self, id: DbId) -> CoreResult<Option<PastIntern>>;

    async fn list_past_interns(&self) -> CoreResult<Vec<PastIntern>>;
}
