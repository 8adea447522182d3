use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| anyhow!("expected a task id, got: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub is_editing: bool,
}

impl Task {
    /// Builds an active, non-editing task. `title` must already be trimmed and non-empty.
    pub fn new_active(id: TaskId, title: String) -> Self {
        Self {
            id,
            title,
            is_editing: false,
        }
    }

    pub fn title_contains(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.title.to_lowercase().contains(needle_lower)
    }
}

/// Trims a submitted title, returning `None` when nothing is left.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskId, normalize_title};

    #[test]
    fn normalize_rejects_blank_titles() {
        assert_eq!(normalize_title(""), None);
        assert_eq!(normalize_title("   \t\n"), None);
        assert_eq!(normalize_title("  Buy milk "), Some("Buy milk".to_string()));
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let task = Task::new_active(TaskId(1), "buy tax forms".to_string());
        assert!(task.title_contains("tax"));
        assert!(task.title_contains(&"TAX".to_lowercase()));
        assert!(task.title_contains(""));
        assert!(!task.title_contains("milk"));
    }

    #[test]
    fn task_id_parses_from_shell_tokens() {
        assert_eq!(" 7 ".parse::<TaskId>().unwrap(), TaskId(7));
        assert!("seven".parse::<TaskId>().is_err());
        assert!("-1".parse::<TaskId>().is_err());
    }

    #[test]
    fn serializes_with_plain_numeric_id() {
        let task = Task::new_active(TaskId(3), "Walk dog".to_string());
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"id":3,"title":"Walk dog","is_editing":false}"#);
    }
}
