//! Task data model shared between the TaskDeck client and the store server.
//!
//! A [`Task`] is one to-do entry in a user's collection. The store assigns
//! the [`TaskId`] on creation; the client treats it as an opaque string.
//! Only the `completed` flag is ever mutated after creation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task text length in characters.
pub const MAX_TASK_TEXT_LENGTH: usize = 100;

/// Advertised per-user task limit.
///
/// The submission gate compares the current count against `TASK_LIMIT + 1`,
/// so an eleventh task can exist before rejection kicks in. This off-by-one
/// matches the deployed behavior and is kept deliberately.
pub const TASK_LIMIT: usize = 10;

/// Opaque identifier for a task within a user's collection.
///
/// Assigned by the store on creation (UUID v7 server-side, so iteration
/// order roughly follows creation order). Clients never parse it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a fresh time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this task ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable key identifying a user's collection in the store.
///
/// Resolved by the identity exchange from the sign-in credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserKey(String);

impl UserKey {
    /// Creates a user key from its string representation.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the string representation of this user key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One to-do entry in a user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, unique within the user's collection.
    pub id: TaskId,
    /// The to-do text, 1–100 characters at creation time.
    pub text: String,
    /// Calendar date string. Required non-empty at creation; the format
    /// is otherwise not validated.
    pub due_date: String,
    /// Completion flag. False at creation, toggled thereafter.
    pub completed: bool,
    /// Milliseconds since epoch, set once at creation.
    pub created_at_ms: u64,
}

/// The fields a task create carries; the store fills in the [`TaskId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// The to-do text.
    pub text: String,
    /// Calendar date string.
    pub due_date: String,
    /// Always false at creation.
    pub completed: bool,
    /// Creation timestamp in milliseconds since epoch.
    pub created_at_ms: u64,
}

impl TaskDraft {
    /// Builds a draft for a brand-new task (completed = false).
    #[must_use]
    pub fn new(text: String, due_date: String, created_at_ms: u64) -> Self {
        Self {
            text,
            due_date,
            completed: false,
            created_at_ms,
        }
    }

    /// Materializes the draft into a [`Task`] with the given id.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            text: self.text,
            due_date: self.due_date,
            completed: self.completed,
            created_at_ms: self.created_at_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_generate_is_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn task_id_display_matches_inner() {
        let id = TaskId::new("doc-123");
        assert_eq!(id.to_string(), "doc-123");
        assert_eq!(id.as_str(), "doc-123");
    }

    #[test]
    fn draft_into_task_preserves_fields() {
        let draft = TaskDraft::new("Buy milk".to_string(), "2024-01-01".to_string(), 1700);
        assert!(!draft.completed);
        let task = draft.into_task(TaskId::new("t1"));
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.due_date, "2024-01-01");
        assert!(!task.completed);
        assert_eq!(task.created_at_ms, 1700);
    }

    #[test]
    fn task_serde_round_trip() {
        let task = Task {
            id: TaskId::new("t1"),
            text: "Water plants".to_string(),
            due_date: "2024-06-15".to_string(),
            completed: true,
            created_at_ms: 42,
        };
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, back);
    }
}
