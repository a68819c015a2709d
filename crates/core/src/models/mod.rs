//! Entity models and their insert/patch DTOs.
//!
//! Each submodule follows the same shape:
//! - a `Serialize` entity struct as stored and returned by the store
//! - a `New*` input struct for inserts
//! - where partial updates exist, a `*Patch` struct (all `Option` fields)

pub mod attendance;
pub mod identity;
pub mod past_intern;
pub mod pending;
pub mod progress;
pub mod project;

pub use attendance::{AttendanceEntry, AttendanceSource, AttendanceStatus, NewAttendance};
pub use identity::{
    Employment, Identity, IdentityPatch, NewIdentity, NotificationSettings, SecuritySettings,
};
pub use past_intern::{NewPastIntern, PastIntern, PastInternStats, ProjectSnapshot};
pub use pending::{NewPendingStudent, PendingStudent};
pub use progress::{NewProgressUpdate, ProgressUpdate};
pub use project::{FeedbackEntry, NewProject, Project, ProjectPatch, ProjectStatus, ProjectTask};
