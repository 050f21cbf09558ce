//! WebSocket client to the hosted document store.
//!
//! [`RemoteStore`] implements both [`TaskStore`] and
//! [`IdentityExchange`](crate::auth::IdentityExchange) — the hosted backend
//! answers credential exchanges and document operations over the same
//! connection.
//!
//! Every request carries a correlation id; a background reader task routes
//! each response to the oneshot channel of the request that issued it, so
//! overlapping operations may resolve in any order. Connecting and
//! registering are bounded by a timeout, but an issued request is never
//! timed out or cancelled — a hung store leaves the caller suspended.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

use taskdeck_proto::identity::Profile;
use taskdeck_proto::task::{Task, TaskDraft, TaskId, UserKey};
use taskdeck_proto::wire::{
    self, RequestEnvelope, StoreRequest, StoreResponse, WireErrorKind,
};

use crate::auth::{AuthError, IdentityExchange};

use super::{StoreError, TaskStore};

/// Type alias for the write half of the WebSocket connection.
type WsSender = futures_util::stream::SplitSink<
    WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    Message,
>;

/// Map of in-flight request ids to their response channels.
type PendingMap = Arc<Mutex<HashMap<Uuid, oneshot::Sender<StoreResponse>>>>;

/// Default timeout for connecting to the store server.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket store adapter.
pub struct RemoteStore {
    ws_sender: Arc<Mutex<WsSender>>,
    pending: PendingMap,
    connected: Arc<AtomicBool>,
    /// Handle to the background reader task (kept alive for the adapter's lifetime).
    _reader_handle: tokio::task::JoinHandle<()>,
}

impl RemoteStore {
    /// Connect to a store server.
    ///
    /// Establishes the WebSocket connection (10s timeout) and spawns the
    /// background reader that routes responses to pending requests.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] if the connection attempt times out.
    /// - [`StoreError::Backend`] if the URL cannot be connected.
    pub async fn connect(store_url: &str) -> Result<Self, StoreError> {
        let (ws_stream, _response) =
            tokio::time::timeout(CONNECT_TIMEOUT, connect_async(store_url))
                .await
                .map_err(|_| {
                    tracing::warn!(url = store_url, "store WebSocket connect timed out");
                    StoreError::Timeout
                })?
                .map_err(|e| {
                    tracing::warn!(url = store_url, err = %e, "store WebSocket connect failed");
                    StoreError::Backend(format!("connect failed: {e}"))
                })?;

        let (ws_sender, mut ws_reader) = ws_stream.split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));

        let reader_pending = Arc::clone(&pending);
        let reader_connected = Arc::clone(&connected);
        let reader_handle = tokio::spawn(async move {
            while let Some(frame) = ws_reader.next().await {
                let frame = match frame {
                    Ok(f) => f,
                    Err(e) => {
                        tracing::warn!(err = %e, "store connection read error");
                        break;
                    }
                };
                match frame {
                    Message::Text(json) => match wire::decode_response(json.as_str()) {
                        Ok(envelope) => {
                            let mut map = reader_pending.lock().await;
                            match map.remove(&envelope.request_id) {
                                Some(tx) => {
                                    let _ = tx.send(envelope.response);
                                }
                                None => {
                                    tracing::debug!(
                                        request_id = %envelope.request_id,
                                        "response for unknown request, dropping"
                                    );
                                }
                            }
                        }
                        Err(e) => {
                            tracing::warn!(err = %e, "dropping malformed response frame");
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            reader_connected.store(false, Ordering::SeqCst);
            // Fail everything still in flight: dropping the senders makes
            // the waiting requests resolve to ConnectionClosed.
            reader_pending.lock().await.clear();
            tracing::info!("store connection closed");
        });

        Ok(Self {
            ws_sender: Arc::new(Mutex::new(ws_sender)),
            pending,
            connected,
            _reader_handle: reader_handle,
        })
    }

    /// Whether the connection to the store is still up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Sends one request and waits for its correlated response.
    async fn request(&self, request: StoreRequest) -> Result<StoreResponse, StoreError> {
        if !self.is_connected() {
            return Err(StoreError::ConnectionClosed);
        }

        let envelope = RequestEnvelope::new(request);
        let (tx, rx) = oneshot::channel();
        {
            let mut map = self.pending.lock().await;
            map.insert(envelope.request_id, tx);
        }

        let json = wire::encode_request(&envelope)?;
        let send_result = {
            let mut sender = self.ws_sender.lock().await;
            sender.send(Message::Text(json.into())).await
        };
        if let Err(e) = send_result {
            self.pending.lock().await.remove(&envelope.request_id);
            tracing::warn!(err = %e, "store request send failed");
            return Err(StoreError::ConnectionClosed);
        }

        // No timeout past this point: a hung store leaves us suspended.
        rx.await.map_err(|_| StoreError::ConnectionClosed)
    }
}

/// Maps a server-reported error into a [`StoreError`].
fn map_wire_error(kind: WireErrorKind, reason: String) -> StoreError {
    match kind {
        WireErrorKind::NotFound => StoreError::NotFound(reason),
        WireErrorKind::Auth | WireErrorKind::Store => StoreError::Backend(reason),
    }
}

impl TaskStore for RemoteStore {
    async fn list(&self, user_key: &UserKey) -> Result<Vec<Task>, StoreError> {
        let response = self
            .request(StoreRequest::ListTasks {
                user_key: user_key.clone(),
            })
            .await?;
        match response {
            StoreResponse::Tasks { tasks } => Ok(tasks),
            StoreResponse::Error { kind, reason } => Err(map_wire_error(kind, reason)),
            other => Err(StoreError::Backend(format!("unexpected response: {other:?}"))),
        }
    }

    async fn create(&self, user_key: &UserKey, draft: TaskDraft) -> Result<TaskId, StoreError> {
        let response = self
            .request(StoreRequest::CreateTask {
                user_key: user_key.clone(),
                draft,
            })
            .await?;
        match response {
            StoreResponse::Created { task_id } => Ok(task_id),
            StoreResponse::Error { kind, reason } => Err(map_wire_error(kind, reason)),
            other => Err(StoreError::Backend(format!("unexpected response: {other:?}"))),
        }
    }

    async fn update_completed(
        &self,
        user_key: &UserKey,
        task_id: &TaskId,
        completed: bool,
    ) -> Result<(), StoreError> {
        let response = self
            .request(StoreRequest::UpdateCompleted {
                user_key: user_key.clone(),
                task_id: task_id.clone(),
                completed,
            })
            .await?;
        match response {
            StoreResponse::Updated => Ok(()),
            StoreResponse::Error { kind, reason } => Err(map_wire_error(kind, reason)),
            other => Err(StoreError::Backend(format!("unexpected response: {other:?}"))),
        }
    }

    async fn delete(&self, user_key: &UserKey, task_id: &TaskId) -> Result<(), StoreError> {
        let response = self
            .request(StoreRequest::DeleteTask {
                user_key: user_key.clone(),
                task_id: task_id.clone(),
            })
            .await?;
        match response {
            StoreResponse::Deleted => Ok(()),
            StoreResponse::Error { kind, reason } => Err(map_wire_error(kind, reason)),
            other => Err(StoreError::Backend(format!("unexpected response: {other:?}"))),
        }
    }
}

impl IdentityExchange for RemoteStore {
    async fn exchange_credential(&self, code: &str) -> Result<Profile, AuthError> {
        let response = self
            .request(StoreRequest::ExchangeCredential {
                code: code.to_string(),
            })
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        match response {
            StoreResponse::Profile(profile) => Ok(profile),
            StoreResponse::Error {
                kind: WireErrorKind::Auth,
                ..
            } => Err(AuthError::InvalidCredential),
            other => Err(AuthError::Unavailable(format!(
                "unexpected response: {other:?}"
            ))),
        }
    }
}
