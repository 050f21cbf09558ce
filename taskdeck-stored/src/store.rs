//! In-memory per-user document collections.
//!
//! The [`DocumentStore`] holds one insertion-ordered collection of tasks per
//! user key. Collections are fully independent; listing a user's collection
//! returns tasks in the order they were created, which is the iteration
//! order clients observe.

use std::collections::HashMap;

use tokio::sync::RwLock;

use taskdeck_proto::task::{Task, TaskDraft, TaskId, UserKey};

/// In-memory document store, thread-safe via [`RwLock`].
#[derive(Default)]
pub struct DocumentStore {
    collections: RwLock<HashMap<String, Vec<Task>>>,
}

impl DocumentStore {
    /// Creates a new, empty document store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all tasks in a user's collection, in insertion order.
    ///
    /// An unknown user key yields an empty list.
    pub async fn list(&self, user_key: &UserKey) -> Vec<Task> {
        let collections = self.collections.read().await;
        collections
            .get(user_key.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Stores a new task in the user's collection and returns its id.
    pub async fn create(&self, user_key: &UserKey, draft: TaskDraft) -> TaskId {
        let id = TaskId::generate();
        let task = draft.into_task(id.clone());
        let mut collections = self.collections.write().await;
        collections
            .entry(user_key.as_str().to_string())
            .or_default()
            .push(task);
        id
    }

    /// Overwrites a task's completion flag.
    ///
    /// Returns `false` if the user has no such document.
    pub async fn update_completed(
        &self,
        user_key: &UserKey,
        task_id: &TaskId,
        completed: bool,
    ) -> bool {
        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(user_key.as_str()) else {
            return false;
        };
        match collection.iter_mut().find(|t| t.id == *task_id) {
            Some(task) => {
                task.completed = completed;
                true
            }
            None => false,
        }
    }

    /// Removes a task from the user's collection.
    ///
    /// Removing an absent id is a no-op; the call always succeeds.
    pub async fn delete(&self, user_key: &UserKey, task_id: &TaskId) {
        let mut collections = self.collections.write().await;
        if let Some(collection) = collections.get_mut(user_key.as_str()) {
            collection.retain(|t| t.id != *task_id);
        }
    }

    /// Returns the number of tasks in a user's collection.
    pub async fn collection_len(&self, user_key: &UserKey) -> usize {
        let collections = self.collections.read().await;
        collections.get(user_key.as_str()).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str) -> TaskDraft {
        TaskDraft::new(text.to_string(), "2024-01-01".to_string(), 0)
    }

    fn user(key: &str) -> UserKey {
        UserKey::new(key)
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let store = DocumentStore::new();
        let id = store.create(&user("alice"), draft("Buy milk")).await;

        let tasks = store.list(&user("alice")).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].text, "Buy milk");
        assert!(!tasks[0].completed);
    }

    #[tokio::test]
    async fn list_unknown_user_is_empty() {
        let store = DocumentStore::new();
        assert!(store.list(&user("nobody")).await.is_empty());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = DocumentStore::new();
        store.create(&user("alice"), draft("first")).await;
        store.create(&user("alice"), draft("second")).await;
        store.create(&user("alice"), draft("third")).await;

        let tasks = store.list(&user("alice")).await;
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn collections_are_per_user() {
        let store = DocumentStore::new();
        store.create(&user("alice"), draft("hers")).await;
        store.create(&user("bob"), draft("his")).await;

        assert_eq!(store.list(&user("alice")).await.len(), 1);
        assert_eq!(store.list(&user("bob")).await.len(), 1);
        assert_eq!(store.list(&user("alice")).await[0].text, "hers");
    }

    #[tokio::test]
    async fn update_completed_flips_flag() {
        let store = DocumentStore::new();
        let id = store.create(&user("alice"), draft("Buy milk")).await;

        assert!(store.update_completed(&user("alice"), &id, true).await);
        assert!(store.list(&user("alice")).await[0].completed);

        assert!(store.update_completed(&user("alice"), &id, false).await);
        assert!(!store.list(&user("alice")).await[0].completed);
    }

    #[tokio::test]
    async fn update_unknown_document_reports_missing() {
        let store = DocumentStore::new();
        store.create(&user("alice"), draft("Buy milk")).await;
        let missing = TaskId::new("no-such-doc");
        assert!(!store.update_completed(&user("alice"), &missing, true).await);
    }

    #[tokio::test]
    async fn update_unknown_user_reports_missing() {
        let store = DocumentStore::new();
        let id = TaskId::new("t1");
        assert!(!store.update_completed(&user("nobody"), &id, true).await);
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = DocumentStore::new();
        let id = store.create(&user("alice"), draft("Buy milk")).await;
        store.delete(&user("alice"), &id).await;
        assert!(store.list(&user("alice")).await.is_empty());
    }

    #[tokio::test]
    async fn delete_absent_id_is_noop() {
        let store = DocumentStore::new();
        store.create(&user("alice"), draft("Buy milk")).await;
        store.delete(&user("alice"), &TaskId::new("ghost")).await;
        assert_eq!(store.collection_len(&user("alice")).await, 1);
    }

    #[tokio::test]
    async fn delete_for_unknown_user_is_noop() {
        let store = DocumentStore::new();
        store.delete(&user("nobody"), &TaskId::new("ghost")).await;
        assert_eq!(store.collection_len(&user("nobody")).await, 0);
    }

    #[tokio::test]
    async fn update_does_not_touch_other_fields() {
        let store = DocumentStore::new();
        let id = store
            .create(
                &user("alice"),
                TaskDraft::new("Read book".to_string(), "2024-02-02".to_string(), 99),
            )
            .await;
        store.update_completed(&user("alice"), &id, true).await;

        let tasks = store.list(&user("alice")).await;
        assert_eq!(tasks[0].text, "Read book");
        assert_eq!(tasks[0].due_date, "2024-02-02");
        assert_eq!(tasks[0].created_at_ms, 99);
    }
}
