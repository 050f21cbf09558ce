//! Wire protocol between the TaskDeck client and the document store server.
//!
//! Requests and responses are JSON-encoded and carried in WebSocket text
//! frames. Every request carries a client-generated `request_id`; the server
//! echoes it back so the client can correlate responses to in-flight
//! requests in any order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Profile;
use crate::task::{Task, TaskDraft, TaskId, UserKey};

/// Error type for wire encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Coarse error categories the server reports back to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireErrorKind {
    /// Credential exchange failed (invalid or expired code).
    Auth,
    /// The referenced document does not exist.
    NotFound,
    /// Any other store-side failure.
    Store,
}

/// Operations a client can ask the store server to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreRequest {
    /// Exchange a sign-in credential for a resolved [`Profile`].
    ExchangeCredential {
        /// The provider credential (opaque to the store).
        code: String,
    },
    /// List all tasks in a user's collection.
    ListTasks {
        /// The collection owner.
        user_key: UserKey,
    },
    /// Create a task; the server assigns and returns the [`TaskId`].
    CreateTask {
        /// The collection owner.
        user_key: UserKey,
        /// The task fields to store.
        draft: TaskDraft,
    },
    /// Overwrite a task's completion flag.
    UpdateCompleted {
        /// The collection owner.
        user_key: UserKey,
        /// The task to update.
        task_id: TaskId,
        /// The new flag value.
        completed: bool,
    },
    /// Delete a task. Deleting an absent id succeeds as a no-op.
    DeleteTask {
        /// The collection owner.
        user_key: UserKey,
        /// The task to delete.
        task_id: TaskId,
    },
}

/// Server answers, one per [`StoreRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreResponse {
    /// Successful credential exchange.
    Profile(Profile),
    /// The user's tasks in store iteration order.
    Tasks {
        /// All tasks in the collection.
        tasks: Vec<Task>,
    },
    /// A task was created.
    Created {
        /// The store-assigned identifier.
        task_id: TaskId,
    },
    /// The completion flag was updated.
    Updated,
    /// The task was deleted (or did not exist).
    Deleted,
    /// The request failed; the operation did not apply.
    Error {
        /// Coarse failure category.
        kind: WireErrorKind,
        /// Human-readable description.
        reason: String,
    },
}

/// A request with its correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Client-generated correlation id, echoed in the response.
    pub request_id: Uuid,
    /// The operation to perform.
    pub request: StoreRequest,
}

impl RequestEnvelope {
    /// Wraps a request with a fresh correlation id.
    #[must_use]
    pub fn new(request: StoreRequest) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            request,
        }
    }
}

/// A response tagged with the id of the request it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// The correlation id from the originating request.
    pub request_id: Uuid,
    /// The server's answer.
    pub response: StoreResponse,
}

/// Encodes a [`RequestEnvelope`] as a JSON string.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the envelope cannot be serialized.
pub fn encode_request(envelope: &RequestEnvelope) -> Result<String, CodecError> {
    serde_json::to_string(envelope).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`RequestEnvelope`] from a JSON string.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the input is not a valid envelope.
pub fn decode_request(json: &str) -> Result<RequestEnvelope, CodecError> {
    serde_json::from_str(json).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Encodes a [`ResponseEnvelope`] as a JSON string.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the envelope cannot be serialized.
pub fn encode_response(envelope: &ResponseEnvelope) -> Result<String, CodecError> {
    serde_json::to_string(envelope).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`ResponseEnvelope`] from a JSON string.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the input is not a valid envelope.
pub fn decode_response(json: &str) -> Result<ResponseEnvelope, CodecError> {
    serde_json::from_str(json).map_err(|e| CodecError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_list_request() {
        let envelope = RequestEnvelope::new(StoreRequest::ListTasks {
            user_key: UserKey::new("user-1"),
        });
        let json = encode_request(&envelope).unwrap();
        let decoded = decode_request(&json).unwrap();
        assert_eq!(envelope, decoded);
    }

    #[test]
    fn round_trip_create_request() {
        let envelope = RequestEnvelope::new(StoreRequest::CreateTask {
            user_key: UserKey::new("user-1"),
            draft: TaskDraft::new("Buy milk".to_string(), "2024-01-01".to_string(), 1000),
        });
        let json = encode_request(&envelope).unwrap();
        let decoded = decode_request(&json).unwrap();
        assert_eq!(envelope, decoded);
    }

    #[test]
    fn round_trip_error_response() {
        let envelope = ResponseEnvelope {
            request_id: Uuid::now_v7(),
            response: StoreResponse::Error {
                kind: WireErrorKind::Auth,
                reason: "unknown credential".to_string(),
            },
        };
        let json = encode_response(&envelope).unwrap();
        let decoded = decode_response(&json).unwrap();
        assert_eq!(envelope, decoded);
    }

    #[test]
    fn response_echoes_request_id() {
        let request = RequestEnvelope::new(StoreRequest::DeleteTask {
            user_key: UserKey::new("user-1"),
            task_id: TaskId::new("t1"),
        });
        let response = ResponseEnvelope {
            request_id: request.request_id,
            response: StoreResponse::Deleted,
        };
        assert_eq!(request.request_id, response.request_id);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(decode_request("not json").is_err());
        assert!(decode_response("{\"nope\":1}").is_err());
    }

    #[test]
    fn fresh_envelopes_get_distinct_ids() {
        let a = RequestEnvelope::new(StoreRequest::ListTasks {
            user_key: UserKey::new("u"),
        });
        let b = RequestEnvelope::new(StoreRequest::ListTasks {
            user_key: UserKey::new("u"),
        });
        assert_ne!(a.request_id, b.request_id);
    }
}
