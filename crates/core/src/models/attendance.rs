//! Attendance entries: append-only, owned by exactly one identity.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Attendance status for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    #[serde(rename = "Half-Day")]
    HalfDay,
    Leave,
}

impl AttendanceStatus {
    /// Canonical display string, matching the wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::HalfDay => "Half-Day",
            AttendanceStatus::Leave => "Leave",
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            "Late" => Ok(AttendanceStatus::Late),
            "Half-Day" => Ok(AttendanceStatus::HalfDay),
            "Leave" => Ok(AttendanceStatus::Leave),
            other => Err(format!("Unknown attendance status: {other}")),
        }
    }
}

/// Which of the two parallel attendance lists an entry belongs to.
///
/// The original system kept admin-recorded attendance and student
/// self-reported attendance as separate sequences; read views merge the two
/// (newest first) regardless of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceSource {
    Admin,
    SelfReported,
}

impl AttendanceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceSource::Admin => "admin",
            AttendanceSource::SelfReported => "self_reported",
        }
    }
}

impl std::str::FromStr for AttendanceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AttendanceSource::Admin),
            "self_reported" => Ok(AttendanceSource::SelfReported),
            other => Err(format!("Unknown attendance source: {other}")),
        }
    }
}

/// A single recorded attendance entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub id: DbId,
    pub date: Timestamp,
    pub status: AttendanceStatus,
    pub source: AttendanceSource,
    /// Free-text time of day, e.g. `"09:15"`.
    pub time_in: Option<String>,
    pub time_out: Option<String>,
    pub notes: Option<String>,
}

/// Input for recording an attendance entry. `date` defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendance {
    pub date: Option<Timestamp>,
    pub status: AttendanceStatus,
    pub time_in: Option<String>,
    pub time_out: Option<String>,
    pub notes: Option<String>,
}
