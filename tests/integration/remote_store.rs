//! Integration tests for the WebSocket store adapter against an in-process
//! store server.
//!
//! The server binds an ephemeral port; each test gets its own server and
//! connection. Exercised here: credential exchange, the four document
//! operations, per-user collection isolation, and the error mapping for
//! missing documents.

use taskdeck::auth::{AuthError, IdentityExchange};
use taskdeck::store::remote::RemoteStore;
use taskdeck::store::{StoreError, TaskStore};

use taskdeck_proto::task::{TaskDraft, TaskId, UserKey};

use taskdeck_stored::server;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Start an open-credentials server and connect one client to it.
async fn connect() -> RemoteStore {
    let (addr, _handle) = server::start_server("127.0.0.1:0")
        .await
        .expect("server start");
    RemoteStore::connect(&format!("ws://{addr}/ws"))
        .await
        .expect("client connect")
}

fn draft(text: &str) -> TaskDraft {
    TaskDraft::new(text.to_string(), "2024-01-01".to_string(), 0)
}

// ===========================================================================
// Credential exchange
// ===========================================================================

#[tokio::test]
async fn exchange_resolves_a_profile_over_the_wire() {
    let store = connect().await;
    let profile = store.exchange_credential("ada").await.unwrap();
    assert_eq!(profile.user_key.as_str(), "user-ada");
    assert_eq!(profile.display_name, "ada");
}

#[tokio::test]
async fn empty_credential_is_rejected() {
    let store = connect().await;
    let err = store.exchange_credential("").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential));
}

// ===========================================================================
// Document operations
// ===========================================================================

#[tokio::test]
async fn create_then_list_round_trips() {
    let store = connect().await;
    let user = UserKey::new("u1");

    let id = store.create(&user, draft("Buy milk")).await.unwrap();
    let tasks = store.list(&user).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);
    assert_eq!(tasks[0].text, "Buy milk");
    assert_eq!(tasks[0].due_date, "2024-01-01");
    assert!(!tasks[0].completed);
}

#[tokio::test]
async fn update_flips_the_completion_flag() {
    let store = connect().await;
    let user = UserKey::new("u1");
    let id = store.create(&user, draft("Buy milk")).await.unwrap();

    store.update_completed(&user, &id, true).await.unwrap();
    assert!(store.list(&user).await.unwrap()[0].completed);

    store.update_completed(&user, &id, false).await.unwrap();
    assert!(!store.list(&user).await.unwrap()[0].completed);
}

#[tokio::test]
async fn update_missing_document_maps_to_not_found() {
    let store = connect().await;
    let err = store
        .update_completed(&UserKey::new("u1"), &TaskId::new("ghost"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_the_document() {
    let store = connect().await;
    let user = UserKey::new("u1");
    let id = store.create(&user, draft("Buy milk")).await.unwrap();

    store.delete(&user, &id).await.unwrap();
    assert!(store.list(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_absent_document_is_noop_success() {
    let store = connect().await;
    let user = UserKey::new("u1");
    store.create(&user, draft("keep")).await.unwrap();

    store.delete(&user, &TaskId::new("ghost")).await.unwrap();
    assert_eq!(store.list(&user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn collections_are_isolated_per_user() {
    let store = connect().await;
    store
        .create(&UserKey::new("u1"), draft("mine"))
        .await
        .unwrap();

    assert!(store.list(&UserKey::new("u2")).await.unwrap().is_empty());
}

// ===========================================================================
// Overlapping requests
// ===========================================================================

#[tokio::test]
async fn concurrent_requests_resolve_to_their_own_callers() {
    let store = std::sync::Arc::new(connect().await);
    let user = UserKey::new("u1");

    // Fire several creates at once over the same connection; correlation
    // ids must keep the responses sorted out.
    let mut handles = Vec::new();
    for i in 0..8 {
        let store = std::sync::Arc::clone(&store);
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            store.create(&user, draft(&format!("task {i}"))).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    assert_eq!(ids.len(), 8);

    assert_eq!(store.list(&user).await.unwrap().len(), 8);
}
