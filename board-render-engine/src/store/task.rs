use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque task identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One to-do item. `order` values across the live list always form a dense
/// permutation of `0..len`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    // Only id and title are required of a persisted record; everything else
    // falls back to defaults so one sloppy field does not drop the task.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub order: usize,
}

impl Task {
    pub fn new(title: &str, description: &str, order: usize) -> Self {
        Self {
            id: TaskId::new(),
            title: title.trim().to_owned(),
            description: description.trim().to_owned(),
            completed: false,
            created_at: Utc::now().timestamp_millis(),
            completed_at: None,
            order,
        }
    }
}

/// Partial update for [`edit`](super::task_store::TaskStore::edit); only
/// supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Process-wide view filter. Never reorders the underlying list, only the
/// derived query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Done,
}

impl Filter {
    /// Parse a persisted filter string. Unrecognized values yield `None` so
    /// callers can ignore them silently.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Done => "done",
        }
    }

    pub fn accepts(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Done => task.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_trims_inputs() {
        let task = Task::new("  Buy milk  ", "  2%  ", 0);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2%");
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn filter_parsing_rejects_unknown_values() {
        assert_eq!(Filter::from_str("active"), Some(Filter::Active));
        assert_eq!(Filter::from_str("bogus"), None);
        assert_eq!(Filter::from_str(""), None);
    }

    #[test]
    fn filter_acceptance() {
        let mut task = Task::new("t", "", 0);
        assert!(Filter::All.accepts(&task));
        assert!(Filter::Active.accepts(&task));
        assert!(!Filter::Done.accepts(&task));
        task.completed = true;
        assert!(Filter::Done.accepts(&task));
        assert!(!Filter::Active.accepts(&task));
    }
}
