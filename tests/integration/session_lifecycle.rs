//! Integration tests for the session lifecycle over the full client stack:
//! remote store adapter, session holder, controller.
//!
//! Covers sign-in, the first load, logging out (everything cleared, session
//! gone), and signing back in as a different user without bleed-over from
//! the previous session.

use std::sync::Arc;

use taskdeck::auth::IdentityExchange;
use taskdeck::controller::{LoadPhase, TaskListController};
use taskdeck::session::{Session, SessionHolder};
use taskdeck::store::remote::RemoteStore;

use taskdeck_stored::server;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Stack {
    store: Arc<RemoteStore>,
    sessions: Arc<SessionHolder>,
    controller: TaskListController<RemoteStore>,
}

async fn connect_stack() -> Stack {
    let (addr, _handle) = server::start_server("127.0.0.1:0")
        .await
        .expect("server start");
    let store = Arc::new(
        RemoteStore::connect(&format!("ws://{addr}/ws"))
            .await
            .expect("client connect"),
    );
    let sessions = Arc::new(SessionHolder::new());
    let controller = TaskListController::new(Arc::clone(&store), Arc::clone(&sessions));
    Stack {
        store,
        sessions,
        controller,
    }
}

/// Exchange a credential and install the resulting session.
async fn sign_in(stack: &Stack, code: &str) {
    let profile = stack
        .store
        .exchange_credential(code)
        .await
        .expect("exchange");
    stack.sessions.establish(Session {
        profile,
        credential: code.to_string(),
    });
}

// ===========================================================================
// Sign-in and first load
// ===========================================================================

#[tokio::test]
async fn sign_in_then_load_shows_an_empty_ready_list() {
    let stack = connect_stack().await;
    sign_in(&stack, "ada").await;

    stack.controller.load_tasks().await;

    let snapshot = stack.controller.snapshot();
    assert_eq!(snapshot.phase, LoadPhase::Ready);
    assert!(snapshot.tasks.is_empty());
    assert_eq!(snapshot.completed_count, 0);
}

#[tokio::test]
async fn load_without_a_session_does_nothing() {
    let stack = connect_stack().await;

    stack.controller.load_tasks().await;

    let snapshot = stack.controller.snapshot();
    assert_eq!(snapshot.phase, LoadPhase::Unloaded);
    assert!(snapshot.tasks.is_empty());
}

// ===========================================================================
// Logout
// ===========================================================================

#[tokio::test]
async fn log_out_clears_list_count_alert_and_session() {
    let stack = connect_stack().await;
    sign_in(&stack, "ada").await;

    let id = stack
        .controller
        .submit_task("Buy milk", "2024-01-01")
        .await
        .unwrap();
    stack.controller.toggle_completed(&id).await;
    stack
        .controller
        .submit_task("", "2024-01-01")
        .await
        .unwrap_err();
    assert!(stack.controller.snapshot().alert.is_some());

    stack.controller.log_out();

    let snapshot = stack.controller.snapshot();
    assert!(snapshot.tasks.is_empty());
    assert_eq!(snapshot.completed_count, 0);
    assert!(snapshot.alert.is_none());
    assert_eq!(snapshot.phase, LoadPhase::Unloaded);
    assert!(stack.sessions.current().is_none());
}

#[tokio::test]
async fn documents_survive_logout_on_the_server() {
    let stack = connect_stack().await;
    sign_in(&stack, "ada").await;
    stack
        .controller
        .submit_task("Buy milk", "2024-01-01")
        .await
        .unwrap();

    // Logging out clears the client, not the hosted collection.
    stack.controller.log_out();
    sign_in(&stack, "ada").await;
    stack.controller.load_tasks().await;

    let snapshot = stack.controller.snapshot();
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.tasks[0].text, "Buy milk");
}

// ===========================================================================
// Session switch
// ===========================================================================

#[tokio::test]
async fn second_user_sees_their_own_collection_only() {
    let stack = connect_stack().await;

    sign_in(&stack, "ada").await;
    stack
        .controller
        .submit_task("Ada's task", "2024-01-01")
        .await
        .unwrap();
    stack.controller.log_out();

    sign_in(&stack, "grace").await;
    stack.controller.load_tasks().await;

    let snapshot = stack.controller.snapshot();
    assert_eq!(snapshot.phase, LoadPhase::Ready);
    assert!(snapshot.tasks.is_empty());
}
