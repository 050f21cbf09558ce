//! Store server core: shared state, WebSocket handler, request dispatch.
//!
//! Each client connection speaks a strict request/response protocol: the
//! client sends a [`RequestEnvelope`] in a text frame, the server applies it
//! against the shared [`DocumentStore`] or [`CredentialDirectory`], and
//! answers with a [`ResponseEnvelope`] carrying the same request id. An
//! operation either fully applies or fully fails; there are no partial
//! successes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use taskdeck_proto::wire::{
    self, RequestEnvelope, ResponseEnvelope, StoreRequest, StoreResponse, WireErrorKind,
};

use crate::credentials::CredentialDirectory;
use crate::store::DocumentStore;

/// Shared server state: the document store and the credential directory.
pub struct StoreState {
    /// Per-user document collections.
    pub documents: DocumentStore,
    /// Sign-in code directory.
    pub credentials: CredentialDirectory,
}

impl StoreState {
    /// Creates state with an empty store and a strict credential directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: DocumentStore::new(),
            credentials: CredentialDirectory::new(),
        }
    }

    /// Creates state whose credential directory accepts any non-empty code.
    #[must_use]
    pub fn with_open_credentials() -> Self {
        Self {
            documents: DocumentStore::new(),
            credentials: CredentialDirectory::allow_any(),
        }
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles one client connection for its whole lifetime.
///
/// Reads request envelopes, dispatches them, and writes the response for
/// each. Malformed frames are logged and skipped; the connection stays up.
pub async fn handle_socket(socket: WebSocket, state: Arc<StoreState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    while let Some(frame) = ws_receiver.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(error = %e, "websocket read error, closing connection");
                break;
            }
        };

        let envelope = match frame {
            Message::Text(json) => match wire::decode_request(json.as_str()) {
                Ok(envelope) => envelope,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed request frame");
                    continue;
                }
            },
            Message::Close(_) => break,
            // Ping/pong handled by axum; binary frames are not part of
            // this protocol.
            _ => continue,
        };

        let RequestEnvelope {
            request_id,
            request,
        } = envelope;
        let response = handle_request(&state, request).await;
        let reply = ResponseEnvelope {
            request_id,
            response,
        };

        let json = match wire::encode_response(&reply) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode response");
                continue;
            }
        };
        if let Err(e) = ws_sender.send(Message::Text(json.into())).await {
            tracing::debug!(error = %e, "websocket write error, closing connection");
            break;
        }
    }
}

/// Applies one request against the shared state and builds the response.
pub async fn handle_request(state: &StoreState, request: StoreRequest) -> StoreResponse {
    match request {
        StoreRequest::ExchangeCredential { code } => {
            match state.credentials.exchange(&code).await {
                Some(profile) => {
                    tracing::info!(user_key = %profile.user_key, "credential exchanged");
                    StoreResponse::Profile(profile)
                }
                None => {
                    tracing::warn!("credential exchange failed");
                    StoreResponse::Error {
                        kind: WireErrorKind::Auth,
                        reason: "invalid or expired credential".to_string(),
                    }
                }
            }
        }
        StoreRequest::ListTasks { user_key } => {
            let tasks = state.documents.list(&user_key).await;
            tracing::debug!(user_key = %user_key, count = tasks.len(), "listed tasks");
            StoreResponse::Tasks { tasks }
        }
        StoreRequest::CreateTask { user_key, draft } => {
            let task_id = state.documents.create(&user_key, draft).await;
            tracing::info!(user_key = %user_key, task_id = %task_id, "task created");
            StoreResponse::Created { task_id }
        }
        StoreRequest::UpdateCompleted {
            user_key,
            task_id,
            completed,
        } => {
            if state
                .documents
                .update_completed(&user_key, &task_id, completed)
                .await
            {
                tracing::debug!(user_key = %user_key, task_id = %task_id, completed, "task updated");
                StoreResponse::Updated
            } else {
                StoreResponse::Error {
                    kind: WireErrorKind::NotFound,
                    reason: format!("no document {task_id}"),
                }
            }
        }
        StoreRequest::DeleteTask { user_key, task_id } => {
            state.documents.delete(&user_key, &task_id).await;
            tracing::debug!(user_key = %user_key, task_id = %task_id, "task deleted");
            StoreResponse::Deleted
        }
    }
}

/// Starts the store server on the given address and returns the bound
/// address plus the serve task handle.
///
/// Binding to port 0 picks an ephemeral port, which is how integration
/// tests run the server in-process.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(StoreState::with_open_credentials())).await
}

/// Starts the store server with pre-configured [`StoreState`].
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<StoreState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "store server error");
        }
    });

    Ok((bound_addr, handle))
}

async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    axum::extract::State(state): axum::extract::State<Arc<StoreState>>,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}
