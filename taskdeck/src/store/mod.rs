//! Task store adapter: the boundary to the hosted document database.
//!
//! Defines the [`TaskStore`] trait every store implementation must satisfy.
//! Concrete implementations:
//! - [`memory::MemoryStore`] — in-process store for offline demo mode and tests
//! - [`remote::RemoteStore`] — WebSocket client to the hosted store server
//!
//! An operation either fully applies or fully fails; there are no
//! partial-success semantics. The adapter performs no retries and applies
//! no timeout once a request has been issued.

pub mod memory;
pub mod remote;

use taskdeck_proto::task::{Task, TaskDraft, TaskId, UserKey};
use taskdeck_proto::wire::CodecError;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The connection to the store has been closed.
    #[error("store connection closed")]
    ConnectionClosed,

    /// Connecting to the store timed out.
    #[error("store connection timed out")]
    Timeout,

    /// The referenced document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The store reported a backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Async seam to a per-user task collection.
///
/// `list` returns tasks in store iteration order; callers must not assume
/// that order is stable across reloads.
pub trait TaskStore: Send + Sync {
    /// Fetch all tasks in the user's collection.
    fn list(
        &self,
        user_key: &UserKey,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Create a task from a draft; the store assigns and returns the id.
    fn create(
        &self,
        user_key: &UserKey,
        draft: TaskDraft,
    ) -> impl std::future::Future<Output = Result<TaskId, StoreError>> + Send;

    /// Overwrite a task's completion flag.
    fn update_completed(
        &self,
        user_key: &UserKey,
        task_id: &TaskId,
        completed: bool,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a task. Deleting an absent id succeeds as a no-op.
    fn delete(
        &self,
        user_key: &UserKey,
        task_id: &TaskId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
