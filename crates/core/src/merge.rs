//! Merge/sort utilities shared by the intern read views.
//!
//! Both attendance and progress sequences may come from two parallel lists
//! (admin-recorded and student-self-reported). Read views present one
//! sequence ordered newest first. The sort must be stable: entries with the
//! same timestamp keep their insertion order across runs.

use crate::models::attendance::AttendanceEntry;
use crate::models::progress::ProgressUpdate;
use crate::types::Timestamp;

/// Sentinel surfaced for missing optional fields so API consumers can rely
/// on field presence.
pub const NOT_AVAILABLE: &str = "Not available";

/// Replace a missing optional string with the [`NOT_AVAILABLE`] sentinel.
pub fn or_not_available(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

/// Merge two sequences and sort descending by the extracted timestamp.
///
/// `sort_by_key` is stable, so ties keep insertion order: all of `a` in its
/// original order, then all of `b` in its original order.
fn merge_desc<T, F>(a: &[T], b: &[T], key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> Timestamp,
{
    let mut merged: Vec<T> = Vec::with_capacity(a.len() + b.len());
    merged.extend_from_slice(a);
    merged.extend_from_slice(b);
    merged.sort_by_key(|entry| std::cmp::Reverse(key(entry)));
    merged
}

/// Merge admin-recorded and self-reported attendance, newest `date` first.
pub fn merge_attendance(
    admin: &[AttendanceEntry],
    self_reported: &[AttendanceEntry],
) -> Vec<AttendanceEntry> {
    merge_desc(admin, self_reported, |entry| entry.date)
}

/// Merge two progress sequences, newest `timestamp` first.
pub fn merge_progress(a: &[ProgressUpdate], b: &[ProgressUpdate]) -> Vec<ProgressUpdate> {
    merge_desc(a, b, |update| update.timestamp)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::attendance::{AttendanceSource, AttendanceStatus};

    fn entry(id: i64, date: Timestamp, source: AttendanceSource) -> AttendanceEntry {
        AttendanceEntry {
            id,
            date,
            status: AttendanceStatus::Present,
            source,
            time_in: None,
            time_out: None,
            notes: None,
        }
    }

    fn day(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, d, 9, 0, 0).unwrap()
    }

    #[test]
    fn merged_attendance_is_descending_by_date() {
        let admin = vec![entry(1, day(1), AttendanceSource::Admin)];
        let student = vec![entry(2, day(3), AttendanceSource::SelfReported)];

        let merged = merge_attendance(&admin, &student);
        let dates: Vec<_> = merged.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(3), day(1)]);
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let admin = vec![
            entry(1, day(2), AttendanceSource::Admin),
            entry(2, day(2), AttendanceSource::Admin),
        ];
        let student = vec![entry(3, day(2), AttendanceSource::SelfReported)];

        let merged = merge_attendance(&admin, &student);
        let ids: Vec<_> = merged.iter().map(|e| e.id).collect();
        // Stable sort: first list's order wins on ties.
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn merge_with_one_empty_side_sorts_the_other() {
        let student = vec![
            entry(1, day(1), AttendanceSource::SelfReported),
            entry(2, day(5), AttendanceSource::SelfReported),
            entry(3, day(3), AttendanceSource::SelfReported),
        ];

        let merged = merge_attendance(&[], &student);
        let ids: Vec<_> = merged.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn not_available_sentinel() {
        assert_eq!(or_not_available(None), "Not available");
        assert_eq!(or_not_available(Some("NUST")), "NUST");
    }
}
