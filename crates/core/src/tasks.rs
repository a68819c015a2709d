//! Task-list input handling.
//!
//! Clients send tasks either as a JSON list or as a single comma-delimited
//! string; both shapes must keep working. Update operations diff the incoming
//! list against the existing one and only fan out projects for genuinely new
//! task names -- dropping a name never removes its project.

use serde::Deserialize;

/// Task list as received on the wire: a list of names or one delimited string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaskInput {
    List(Vec<String>),
    Delimited(String),
}

impl TaskInput {
    /// Normalize into a list of task names.
    ///
    /// Delimited input is split on commas, trimmed, and stripped of empties.
    /// List input is trimmed and stripped of empties as well so the two
    /// shapes normalize identically.
    pub fn into_names(self) -> Vec<String> {
        match self {
            TaskInput::List(names) => names
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            TaskInput::Delimited(raw) => raw
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }
}

/// Names in `incoming` that are not already in `existing` (exact string
/// match), preserving the incoming order.
pub fn new_task_names(existing: &[String], incoming: &[String]) -> Vec<String> {
    incoming
        .iter()
        .filter(|name| !existing.contains(name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_string_splits_trims_and_drops_empties() {
        let input = TaskInput::Delimited("Build API, Write docs , ,Deploy,".to_string());
        assert_eq!(
            input.into_names(),
            vec!["Build API", "Write docs", "Deploy"]
        );
    }

    #[test]
    fn list_input_passes_through_normalized() {
        let input = TaskInput::List(vec![
            " Build API ".to_string(),
            String::new(),
            "Deploy".to_string(),
        ]);
        assert_eq!(input.into_names(), vec!["Build API", "Deploy"]);
    }

    #[test]
    fn untagged_deserialization_accepts_both_shapes() {
        let list: TaskInput = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(list.into_names(), vec!["a", "b"]);

        let delimited: TaskInput = serde_json::from_str(r#""a, b""#).unwrap();
        assert_eq!(delimited.into_names(), vec!["a", "b"]);
    }

    #[test]
    fn task_diff_only_reports_new_names() {
        let existing = vec!["a".to_string(), "b".to_string()];
        let incoming = vec!["b".to_string(), "c".to_string(), "a".to_string()];
        assert_eq!(new_task_names(&existing, &incoming), vec!["c"]);
    }

    #[test]
    fn identical_lists_diff_to_nothing() {
        let tasks = vec!["a".to_string(), "b".to_string()];
        assert!(new_task_names(&tasks, &tasks).is_empty());
    }
}
