//! Task list controller: sole owner of the in-memory task list.
//!
//! All mutations go through the controller's validation gate, and every
//! successful mutation is followed by a full reload from the store
//! (**write-then-refetch**) — the reload's recompute of the completed count
//! is the single source of truth, never incremental bookkeeping. The store
//! is injected at construction; there is no ambient global handle.
//!
//! Store failures never propagate: they are converted into the single
//! pending-alert slot and the controller settles back into `Ready`.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use taskdeck_proto::task::{MAX_TASK_TEXT_LENGTH, TASK_LIMIT, Task, TaskDraft, TaskId};

use crate::session::SessionHolder;
use crate::store::{StoreError, TaskStore};

/// Local rejections raised by the validation gate, before any store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Task text is empty.
    #[error("task text is too short")]
    TextTooShort,
    /// Task text exceeds the maximum length.
    #[error("task text is too long (max {MAX_TASK_TEXT_LENGTH} characters)")]
    TextTooLong,
    /// No due date was chosen.
    #[error("you must choose a due date")]
    DueDateMissing,
    /// The user's collection is full.
    #[error("limit of {TASK_LIMIT} tasks reached")]
    TaskLimitReached,
}

/// Why a submission did not result in a stored task.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Rejected by the validation gate; no store call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The store rejected the create; local state is untouched.
    #[error("store create failed: {0}")]
    Store(#[from] StoreError),
    /// No user is signed in.
    #[error("not signed in")]
    LoggedOut,
}

/// Severity of a pending alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    /// A local validation rejection.
    Warning,
    /// A store operation failed.
    Error,
}

/// The single pending alert slot. A newer alert overwrites the older one;
/// there is no queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// How severe the condition is.
    pub severity: AlertSeverity,
    /// User-readable description.
    pub message: String,
}

impl Alert {
    fn validation(err: &ValidationError) -> Self {
        Self {
            severity: AlertSeverity::Warning,
            message: err.to_string(),
        }
    }

    fn store(message: &str) -> Self {
        Self {
            severity: AlertSeverity::Error,
            message: message.to_string(),
        }
    }
}

/// Where the controller is in its load cycle.
///
/// There is no terminal error state: store failures resolve to `Ready`
/// with an alert attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// No session, or nothing loaded yet.
    #[default]
    Unloaded,
    /// A reload is in flight.
    Loading,
    /// The list reflects the last completed reload.
    Ready,
}

/// A point-in-time copy of the controller's state for rendering.
#[derive(Debug, Clone, Default)]
pub struct TaskListSnapshot {
    /// Tasks in store iteration order.
    pub tasks: Vec<Task>,
    /// Count of tasks with `completed == true`; recomputed on every reload.
    pub completed_count: usize,
    /// Load cycle position.
    pub phase: LoadPhase,
    /// The pending alert, if any.
    pub alert: Option<Alert>,
}

/// Owns the task list for the current session and gates all mutations.
pub struct TaskListController<S> {
    store: Arc<S>,
    sessions: Arc<SessionHolder>,
    state: Mutex<TaskListSnapshot>,
}

impl<S: TaskStore> TaskListController<S> {
    /// Creates a controller over an injected store and session holder.
    #[must_use]
    pub fn new(store: Arc<S>, sessions: Arc<SessionHolder>) -> Self {
        Self {
            store,
            sessions,
            state: Mutex::new(TaskListSnapshot::default()),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> TaskListSnapshot {
        self.state.lock().clone()
    }

    /// Clears the pending alert slot.
    pub fn dismiss_alert(&self) {
        self.state.lock().alert = None;
    }

    /// Replaces the task list wholesale with the store's current contents
    /// and recomputes the completed count from the fetched data.
    ///
    /// A reload always starts from a vacuum — no partial merge with prior
    /// state. Results belonging to a stale session epoch are discarded.
    pub async fn load_tasks(&self) {
        let Some((user_key, epoch)) = self.sessions.current_key() else {
            tracing::debug!("reload requested with no session");
            return;
        };

        self.state.lock().phase = LoadPhase::Loading;

        let result = self.store.list(&user_key).await;

        if !self.sessions.is_current(epoch) {
            tracing::debug!("discarding reload result from a stale session");
            return;
        }

        let mut state = self.state.lock();
        match result {
            Ok(tasks) => {
                state.completed_count = tasks.iter().filter(|t| t.completed).count();
                state.tasks = tasks;
            }
            Err(e) => {
                tracing::warn!(err = %e, user_key = %user_key, "task reload failed");
                state.alert = Some(Alert::store("Could not load tasks. Try again."));
            }
        }
        state.phase = LoadPhase::Ready;
    }

    /// Validates and stores a new task, then reloads.
    ///
    /// The gate checks, stopping at the first failure: empty text, text
    /// over 100 characters, empty due date, collection full. The ceiling
    /// admits an eleventh task (see [`TASK_LIMIT`]).
    ///
    /// On store failure local state is left untouched — no optimistic
    /// insert, no reload — and a generic alert is raised.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Validation`] for gate rejections,
    /// [`SubmitError::Store`] when the create fails,
    /// [`SubmitError::LoggedOut`] with no session.
    pub async fn submit_task(&self, text: &str, due_date: &str) -> Result<TaskId, SubmitError> {
        let Some((user_key, epoch)) = self.sessions.current_key() else {
            return Err(SubmitError::LoggedOut);
        };

        if let Err(err) = self.validate(text, due_date) {
            tracing::debug!(reason = %err, "submission rejected");
            self.state.lock().alert = Some(Alert::validation(&err));
            return Err(err.into());
        }

        let draft = TaskDraft::new(text.to_string(), due_date.to_string(), now_ms());
        match self.store.create(&user_key, draft).await {
            Ok(task_id) => {
                tracing::info!(%task_id, "task created");
                if self.sessions.is_current(epoch) {
                    self.load_tasks().await;
                }
                Ok(task_id)
            }
            Err(e) => {
                tracing::warn!(err = %e, "task create failed");
                if self.sessions.is_current(epoch) {
                    self.state.lock().alert =
                        Some(Alert::store("Could not add the task. Try again."));
                }
                Err(e.into())
            }
        }
    }

    /// Flips a task's completion flag in the store, then reloads.
    ///
    /// Between the store's acknowledgment and the reload the completed
    /// count is adjusted by one as a provisional anti-flicker value; the
    /// reload's recompute supersedes it and can never double-count.
    ///
    /// A toggle for an id absent from local state is ignored without a
    /// store call (the row disappeared under an interleaved reload).
    pub async fn toggle_completed(&self, task_id: &TaskId) {
        let Some((user_key, epoch)) = self.sessions.current_key() else {
            return;
        };

        let was_completed = {
            let state = self.state.lock();
            match state.tasks.iter().find(|t| t.id == *task_id) {
                Some(task) => task.completed,
                None => {
                    tracing::debug!(%task_id, "toggle for unknown task, ignoring");
                    return;
                }
            }
        };

        match self
            .store
            .update_completed(&user_key, task_id, !was_completed)
            .await
        {
            Ok(()) => {
                if !self.sessions.is_current(epoch) {
                    return;
                }
                {
                    let mut state = self.state.lock();
                    if was_completed {
                        state.completed_count = state.completed_count.saturating_sub(1);
                    } else {
                        state.completed_count += 1;
                    }
                }
                self.load_tasks().await;
            }
            Err(e) => {
                tracing::warn!(err = %e, %task_id, "task update failed");
                if self.sessions.is_current(epoch) {
                    self.state.lock().alert =
                        Some(Alert::store("Could not update the task. Try again."));
                }
            }
        }
    }

    /// Deletes a task in the store, then reloads.
    ///
    /// The store treats a missing id as a no-op success, so deleting a
    /// task that is already gone raises no alert.
    pub async fn delete_task(&self, task_id: &TaskId) {
        let Some((user_key, epoch)) = self.sessions.current_key() else {
            return;
        };

        match self.store.delete(&user_key, task_id).await {
            Ok(()) => {
                if self.sessions.is_current(epoch) {
                    self.load_tasks().await;
                }
            }
            Err(e) => {
                tracing::warn!(err = %e, %task_id, "task delete failed");
                if self.sessions.is_current(epoch) {
                    self.state.lock().alert =
                        Some(Alert::store("Could not delete the task. Try again."));
                }
            }
        }
    }

    /// Ends the session and clears the whole task list state: sequence,
    /// completed count, pending alert, phase.
    ///
    /// Unconditional — it does not wait for in-flight operations. The
    /// epoch bump makes their late results stale, so they are dropped on
    /// arrival instead of resurrecting the old list.
    pub fn log_out(&self) {
        self.sessions.clear();
        *self.state.lock() = TaskListSnapshot::default();
        tracing::info!("logged out, task list cleared");
    }

    fn validate(&self, text: &str, due_date: &str) -> Result<(), ValidationError> {
        if text.is_empty() {
            return Err(ValidationError::TextTooShort);
        }
        if text.chars().count() > MAX_TASK_TEXT_LENGTH {
            return Err(ValidationError::TextTooLong);
        }
        if due_date.is_empty() {
            return Err(ValidationError::DueDateMissing);
        }
        // Deliberate off-by-one: the gate admits an eleventh task even
        // though the advertised limit is ten. Kept as deployed.
        if self.state.lock().tasks.len() >= TASK_LIMIT + 1 {
            return Err(ValidationError::TaskLimitReached);
        }
        Ok(())
    }
}

/// Current time in milliseconds since epoch.
fn now_ms() -> u64 {
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}
