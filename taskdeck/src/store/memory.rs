//! In-process task store for offline demo mode and tests.
//!
//! Mirrors the server-side collection semantics (per-user isolation,
//! insertion order, no-op delete of absent ids) without any network. A
//! one-shot failure can be injected to exercise the controller's store
//! failure paths.

use std::collections::HashMap;

use tokio::sync::{Mutex, RwLock};

use taskdeck_proto::task::{Task, TaskDraft, TaskId, UserKey};

use super::{StoreError, TaskStore};

/// In-memory [`TaskStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Task>>>,
    fail_next: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next operation fail with a backend error.
    pub async fn inject_failure(&self, reason: &str) {
        let mut fail = self.fail_next.lock().await;
        *fail = Some(reason.to_string());
    }

    async fn take_injected_failure(&self) -> Result<(), StoreError> {
        let mut fail = self.fail_next.lock().await;
        match fail.take() {
            Some(reason) => Err(StoreError::Backend(reason)),
            None => Ok(()),
        }
    }
}

impl TaskStore for MemoryStore {
    async fn list(&self, user_key: &UserKey) -> Result<Vec<Task>, StoreError> {
        self.take_injected_failure().await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(user_key.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, user_key: &UserKey, draft: TaskDraft) -> Result<TaskId, StoreError> {
        self.take_injected_failure().await?;
        let id = TaskId::generate();
        let task = draft.into_task(id.clone());
        let mut collections = self.collections.write().await;
        collections
            .entry(user_key.as_str().to_string())
            .or_default()
            .push(task);
        Ok(id)
    }

    async fn update_completed(
        &self,
        user_key: &UserKey,
        task_id: &TaskId,
        completed: bool,
    ) -> Result<(), StoreError> {
        self.take_injected_failure().await?;
        let mut collections = self.collections.write().await;
        let task = collections
            .get_mut(user_key.as_str())
            .and_then(|c| c.iter_mut().find(|t| t.id == *task_id))
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;
        task.completed = completed;
        Ok(())
    }

    async fn delete(&self, user_key: &UserKey, task_id: &TaskId) -> Result<(), StoreError> {
        self.take_injected_failure().await?;
        let mut collections = self.collections.write().await;
        if let Some(collection) = collections.get_mut(user_key.as_str()) {
            collection.retain(|t| t.id != *task_id);
        }
        Ok(())
    }
}
