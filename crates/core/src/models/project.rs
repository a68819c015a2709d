//! Project entity and its status state machine.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Project status.
///
/// The nominal path is `Not Started -> In Progress -> Under Review ->
/// Completed`, with `Incomplete` and `Cancelled` as side states. Admin status
/// updates are deliberately permissive: any value may be set explicitly. The
/// one automatic transition is `Not Started -> In Progress` when an assigned
/// student submits a progress update against the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Incomplete,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Under Review")]
    UnderReview,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::Incomplete => "Incomplete",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::UnderReview => "Under Review",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(ProjectStatus::NotStarted),
            "Incomplete" => Ok(ProjectStatus::Incomplete),
            "In Progress" => Ok(ProjectStatus::InProgress),
            "Under Review" => Ok(ProjectStatus::UnderReview),
            "Completed" => Ok(ProjectStatus::Completed),
            "Cancelled" => Ok(ProjectStatus::Cancelled),
            other => Err(format!("Unknown project status: {other}")),
        }
    }
}

/// A task line item inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTask {
    pub description: String,
    #[serde(default)]
    pub is_complete: bool,
    pub due_date: Option<Timestamp>,
}

/// An append-only feedback entry attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub comment: String,
    pub date: Timestamp,
    /// Display name of the author (`"admin"` or the student's name).
    pub from: String,
}

/// A unit of assigned work.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    /// Identities this project is assigned to. Kept mutually consistent with
    /// each identity's `assigned_projects` list by the store.
    pub assigned_to: Vec<DbId>,
    pub created_by: String,
    pub tasks: Vec<ProjectTask>,
    /// Append-only; entries are never edited or removed once attached.
    pub feedback: Vec<FeedbackEntry>,
    pub last_modified: Timestamp,
}

/// Input for creating a project. Status always starts at `Not Started`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub assigned_to: Vec<DbId>,
    pub end_date: Option<Timestamp>,
    #[serde(default)]
    pub tasks: Vec<ProjectTask>,
    #[serde(default = "default_created_by")]
    pub created_by: String,
}

fn default_created_by() -> String {
    "admin".to_string()
}

/// Partial update for a project. Only non-`None` fields are applied; every
/// application refreshes `last_modified`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub status: Option<ProjectStatus>,
    pub end_date: Option<Timestamp>,
    pub tasks: Option<Vec<ProjectTask>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_round_trip() {
        for status in [
            ProjectStatus::NotStarted,
            ProjectStatus::Incomplete,
            ProjectStatus::InProgress,
            ProjectStatus::UnderReview,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ] {
            let parsed: ProjectStatus = status.as_str().parse().expect("known status");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_serializes_with_spaces() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::NotStarted).unwrap(),
            "\"Not Started\""
        );
        assert_eq!(
            serde_json::to_string(&ProjectStatus::UnderReview).unwrap(),
            "\"Under Review\""
        );
    }
}
