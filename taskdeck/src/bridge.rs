//! Bridge wiring the TUI to the async controller and store stack.
//!
//! The TUI event loop is synchronous (crossterm poll-based); the controller
//! and store are async. The bridge spawns a tokio command handler and
//! communicates with the main thread via [`UiCommand`] / [`UiEvent`]
//! channels.
//!
//! ```text
//! TUI (main thread)  ←── UiEvent ───  tokio background tasks
//!                     ─── UiCommand →
//! ```
//!
//! Store-bound commands run in their own spawned task so a hung store
//! request never blocks the command loop — in particular, logging out stays
//! possible while a reload is suspended. The epoch check inside the
//! controller takes care of discarding whatever the hung task eventually
//! produces.

use std::sync::Arc;

use tokio::sync::mpsc;

use taskdeck_proto::identity::Profile;
use taskdeck_proto::task::TaskId;

use crate::auth::IdentityExchange;
use crate::controller::{TaskListController, TaskListSnapshot};
use crate::session::{Session, SessionHolder};
use crate::store::TaskStore;

/// Commands sent from the TUI main loop to the background tasks.
#[derive(Debug)]
pub enum UiCommand {
    /// Exchange a credential and establish a session.
    SignIn {
        /// The provider credential entered or configured.
        code: String,
    },
    /// Reload the task list from the store.
    Reload,
    /// Validate and store a new task.
    Submit {
        /// Task text from the input field.
        text: String,
        /// Due date from the input field.
        due_date: String,
    },
    /// Flip a task's completion flag.
    Toggle {
        /// Id of the task row the cursor is on.
        task_id: TaskId,
    },
    /// Delete a task.
    Delete {
        /// Id of the task row the cursor is on.
        task_id: TaskId,
    },
    /// End the session and clear all task state.
    LogOut,
    /// Clear the pending alert slot.
    DismissAlert,
    /// Gracefully shut down the background tasks.
    Shutdown,
}

/// Events sent from the background tasks to the TUI main loop.
#[derive(Debug)]
pub enum UiEvent {
    /// A credential exchange succeeded and a session was established.
    SignedIn {
        /// The resolved profile.
        profile: Profile,
    },
    /// A credential exchange failed; the sign-in view stays up.
    SignInFailed,
    /// The controller's state changed; redraw from this snapshot.
    StateChanged(TaskListSnapshot),
}

/// Default channel capacity for command/event mpsc channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Spawns the background command handler and returns channel handles.
///
/// The identity provider and task store are injected, so offline demo mode
/// (stub identity + memory store) and hosted mode (one remote adapter for
/// both seams) wire up the same way.
pub fn spawn_bridge<S, I>(
    controller: Arc<TaskListController<S>>,
    identity: Arc<I>,
    sessions: Arc<SessionHolder>,
    channel_capacity: usize,
) -> (mpsc::Sender<UiCommand>, mpsc::Receiver<UiEvent>)
where
    S: TaskStore + 'static,
    I: IdentityExchange + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<UiCommand>(channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<UiEvent>(channel_capacity);

    tokio::spawn(async move {
        command_handler(controller, identity, sessions, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: dispatch commands from the TUI main loop.
///
/// Session-local commands (log out, dismiss) apply inline; store-bound
/// commands are spawned so they cannot wedge the loop.
async fn command_handler<S, I>(
    controller: Arc<TaskListController<S>>,
    identity: Arc<I>,
    sessions: Arc<SessionHolder>,
    mut cmd_rx: mpsc::Receiver<UiCommand>,
    evt_tx: mpsc::Sender<UiEvent>,
) where
    S: TaskStore + 'static,
    I: IdentityExchange + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            UiCommand::SignIn { code } => {
                let controller = Arc::clone(&controller);
                let identity = Arc::clone(&identity);
                let sessions = Arc::clone(&sessions);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    sign_in(&controller, identity.as_ref(), &sessions, code, &evt_tx).await;
                });
            }
            UiCommand::Reload => {
                let controller = Arc::clone(&controller);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    controller.load_tasks().await;
                    let _ = evt_tx.send(UiEvent::StateChanged(controller.snapshot())).await;
                });
            }
            UiCommand::Submit { text, due_date } => {
                let controller = Arc::clone(&controller);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    // Rejections already landed in the alert slot; the
                    // snapshot carries everything the TUI needs.
                    let _ = controller.submit_task(&text, &due_date).await;
                    let _ = evt_tx.send(UiEvent::StateChanged(controller.snapshot())).await;
                });
            }
            UiCommand::Toggle { task_id } => {
                let controller = Arc::clone(&controller);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    controller.toggle_completed(&task_id).await;
                    let _ = evt_tx.send(UiEvent::StateChanged(controller.snapshot())).await;
                });
            }
            UiCommand::Delete { task_id } => {
                let controller = Arc::clone(&controller);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    controller.delete_task(&task_id).await;
                    let _ = evt_tx.send(UiEvent::StateChanged(controller.snapshot())).await;
                });
            }
            UiCommand::LogOut => {
                controller.log_out();
                let _ = evt_tx.send(UiEvent::StateChanged(controller.snapshot())).await;
            }
            UiCommand::DismissAlert => {
                controller.dismiss_alert();
                let _ = evt_tx.send(UiEvent::StateChanged(controller.snapshot())).await;
            }
            UiCommand::Shutdown => {
                tracing::info!("bridge command handler shutting down");
                break;
            }
        }
    }
}

/// Exchange the credential, establish the session, trigger the first load.
///
/// A failed exchange is logged and reported as [`UiEvent::SignInFailed`];
/// it never raises a task-list alert.
async fn sign_in<S, I>(
    controller: &TaskListController<S>,
    identity: &I,
    sessions: &SessionHolder,
    code: String,
    evt_tx: &mpsc::Sender<UiEvent>,
) where
    S: TaskStore,
    I: IdentityExchange,
{
    match identity.exchange_credential(&code).await {
        Ok(profile) => {
            tracing::info!(user_key = %profile.user_key, "signed in");
            sessions.establish(Session {
                profile: profile.clone(),
                credential: code,
            });
            let _ = evt_tx.send(UiEvent::SignedIn { profile }).await;
            controller.load_tasks().await;
            let _ = evt_tx
                .send(UiEvent::StateChanged(controller.snapshot()))
                .await;
        }
        Err(e) => {
            tracing::warn!(err = %e, "credential exchange failed");
            let _ = evt_tx.send(UiEvent::SignInFailed).await;
        }
    }
}
