//! End-to-end task life cycle over the full stack: in-process store server,
//! WebSocket adapter, session holder, controller, bridge.
//!
//! The core scenario: sign in, add "Buy milk" due "2024-01-01", see it
//! appear unchecked with a completed count of zero, toggle it done, delete
//! it, and end with an empty list. Plus the task-limit ceiling behavior as
//! deployed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use taskdeck::bridge::{self, UiCommand, UiEvent};
use taskdeck::controller::{AlertSeverity, LoadPhase, TaskListController, TaskListSnapshot};
use taskdeck::session::SessionHolder;
use taskdeck::store::remote::RemoteStore;

use taskdeck_stored::server;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

async fn connect_bridge() -> (mpsc::Sender<UiCommand>, mpsc::Receiver<UiEvent>) {
    let (addr, _handle) = server::start_server("127.0.0.1:0")
        .await
        .expect("server start");
    let store = Arc::new(
        RemoteStore::connect(&format!("ws://{addr}/ws"))
            .await
            .expect("client connect"),
    );
    let sessions = Arc::new(SessionHolder::new());
    let controller = Arc::new(TaskListController::new(Arc::clone(&store), Arc::clone(&sessions)));
    bridge::spawn_bridge(controller, store, sessions, 64)
}

async fn recv(rx: &mut mpsc::Receiver<UiEvent>) -> UiEvent {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("event within timeout")
        .expect("bridge alive")
}

async fn recv_state(rx: &mut mpsc::Receiver<UiEvent>) -> TaskListSnapshot {
    match recv(rx).await {
        UiEvent::StateChanged(snapshot) => snapshot,
        other => panic!("expected StateChanged, got {other:?}"),
    }
}

async fn sign_in(cmd_tx: &mpsc::Sender<UiCommand>, rx: &mut mpsc::Receiver<UiEvent>) {
    cmd_tx
        .send(UiCommand::SignIn {
            code: "ada".to_string(),
        })
        .await
        .unwrap();
    match recv(rx).await {
        UiEvent::SignedIn { .. } => {}
        other => panic!("expected SignedIn, got {other:?}"),
    }
    let snapshot = recv_state(rx).await;
    assert_eq!(snapshot.phase, LoadPhase::Ready);
}

async fn submit(
    cmd_tx: &mpsc::Sender<UiCommand>,
    rx: &mut mpsc::Receiver<UiEvent>,
    text: &str,
    due: &str,
) -> TaskListSnapshot {
    cmd_tx
        .send(UiCommand::Submit {
            text: text.to_string(),
            due_date: due.to_string(),
        })
        .await
        .unwrap();
    recv_state(rx).await
}

// ===========================================================================
// The task life cycle
// ===========================================================================

#[tokio::test]
async fn buy_milk_submit_toggle_delete() {
    let (cmd_tx, mut evt_rx) = connect_bridge().await;
    sign_in(&cmd_tx, &mut evt_rx).await;

    // Add "Buy milk" due 2024-01-01; it shows up unchecked, count 0.
    let snapshot = submit(&cmd_tx, &mut evt_rx, "Buy milk", "2024-01-01").await;
    assert_eq!(snapshot.tasks.len(), 1);
    let task = &snapshot.tasks[0];
    assert_eq!(task.text, "Buy milk");
    assert_eq!(task.due_date, "2024-01-01");
    assert!(!task.completed);
    assert_eq!(snapshot.completed_count, 0);
    assert!(snapshot.alert.is_none());

    // Toggle it done: checked, count 1.
    cmd_tx
        .send(UiCommand::Toggle {
            task_id: task.id.clone(),
        })
        .await
        .unwrap();
    let snapshot = recv_state(&mut evt_rx).await;
    assert!(snapshot.tasks[0].completed);
    assert_eq!(snapshot.completed_count, 1);

    // Delete it: list empty again, count 0.
    cmd_tx
        .send(UiCommand::Delete {
            task_id: snapshot.tasks[0].id.clone(),
        })
        .await
        .unwrap();
    let snapshot = recv_state(&mut evt_rx).await;
    assert!(snapshot.tasks.is_empty());
    assert_eq!(snapshot.completed_count, 0);
    assert_eq!(snapshot.phase, LoadPhase::Ready);
}

#[tokio::test]
async fn rejected_submission_shows_one_warning_and_stores_nothing() {
    let (cmd_tx, mut evt_rx) = connect_bridge().await;
    sign_in(&cmd_tx, &mut evt_rx).await;

    let snapshot = submit(&cmd_tx, &mut evt_rx, "Buy milk", "").await;
    assert!(snapshot.tasks.is_empty());
    let alert = snapshot.alert.expect("validation alert");
    assert_eq!(alert.severity, AlertSeverity::Warning);
    assert!(alert.message.contains("due date"));

    // The gate rejected locally; nothing reached the store.
    cmd_tx.send(UiCommand::Reload).await.unwrap();
    let snapshot = recv_state(&mut evt_rx).await;
    assert!(snapshot.tasks.is_empty());
}

// ===========================================================================
// The ceiling, as deployed
// ===========================================================================

#[tokio::test]
async fn ceiling_accepts_the_eleventh_task_and_rejects_the_twelfth() {
    let (cmd_tx, mut evt_rx) = connect_bridge().await;
    sign_in(&cmd_tx, &mut evt_rx).await;

    for i in 0..10 {
        let snapshot = submit(&cmd_tx, &mut evt_rx, &format!("task {i}"), "2024-01-01").await;
        assert!(snapshot.alert.is_none(), "task {i} should be accepted");
    }

    // With ten tasks present the gate still admits one more.
    let snapshot = submit(&cmd_tx, &mut evt_rx, "eleventh", "2024-01-01").await;
    assert!(snapshot.alert.is_none());
    assert_eq!(snapshot.tasks.len(), 11);

    // With eleven it finally refuses.
    let snapshot = submit(&cmd_tx, &mut evt_rx, "twelfth", "2024-01-01").await;
    let alert = snapshot.alert.expect("limit alert");
    assert_eq!(alert.severity, AlertSeverity::Warning);
    assert!(alert.message.contains("limit"));
    assert_eq!(snapshot.tasks.len(), 11);
}

// ===========================================================================
// Logout with the stack still attached
// ===========================================================================

#[tokio::test]
async fn log_out_mid_session_empties_the_view() {
    let (cmd_tx, mut evt_rx) = connect_bridge().await;
    sign_in(&cmd_tx, &mut evt_rx).await;
    submit(&cmd_tx, &mut evt_rx, "Buy milk", "2024-01-01").await;

    cmd_tx.send(UiCommand::LogOut).await.unwrap();
    let snapshot = recv_state(&mut evt_rx).await;

    assert!(snapshot.tasks.is_empty());
    assert_eq!(snapshot.completed_count, 0);
    assert_eq!(snapshot.phase, LoadPhase::Unloaded);
}
