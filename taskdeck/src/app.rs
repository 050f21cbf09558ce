//! Application state and event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use taskdeck_proto::identity::Profile;
use taskdeck_proto::task::TaskId;

use crate::bridge::{UiCommand, UiEvent};
use crate::controller::TaskListSnapshot;

/// Which view is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Unauthenticated sign-in view.
    SignIn,
    /// Authenticated task list view.
    Tasks,
}

/// Which element of the task view is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The task text input.
    TextInput,
    /// The due date input.
    DueInput,
    /// The task list.
    TaskList,
}

/// Main application state.
pub struct App {
    /// Current view.
    pub view: View,
    /// Sign-in credential input.
    pub code_input: String,
    /// Whether a sign-in is in flight.
    pub signing_in: bool,
    /// Whether the last sign-in attempt failed.
    pub sign_in_failed: bool,
    /// Resolved profile of the signed-in user.
    pub profile: Option<Profile>,

    /// Task text input.
    pub text_input: String,
    /// Cursor position in the text input (character index).
    pub text_cursor: usize,
    /// Due date input.
    pub due_input: String,
    /// Which element is focused.
    pub focus: Focus,
    /// Selected task index.
    pub selected_task: usize,

    /// Latest controller snapshot; the only task data the UI reads.
    pub snapshot: TaskListSnapshot,
    /// Created-at display format string (chrono).
    pub timestamp_format: String,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Create the application in the sign-in view.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view: View::SignIn,
            code_input: String::new(),
            signing_in: false,
            sign_in_failed: false,
            profile: None,
            text_input: String::new(),
            text_cursor: 0,
            due_input: String::new(),
            focus: Focus::TextInput,
            selected_task: 0,
            snapshot: TaskListSnapshot::default(),
            timestamp_format: "%Y-%m-%d".to_string(),
            should_quit: false,
        }
    }

    /// Handle a key event, possibly producing a command for the bridge.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<UiCommand> {
        // Global shortcuts
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return None;
        }
        if key.code == KeyCode::Esc {
            // Esc clears a pending alert first; with nothing to clear it quits.
            if self.snapshot.alert.is_some() {
                return Some(UiCommand::DismissAlert);
            }
            self.should_quit = true;
            return None;
        }

        match self.view {
            View::SignIn => self.handle_sign_in_key(key),
            View::Tasks => self.handle_tasks_key(key),
        }
    }

    /// Apply an event coming back from the bridge.
    pub fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::SignedIn { profile } => {
                self.profile = Some(profile);
                self.view = View::Tasks;
                self.signing_in = false;
                self.sign_in_failed = false;
                self.code_input.clear();
                self.focus = Focus::TextInput;
            }
            UiEvent::SignInFailed => {
                self.signing_in = false;
                self.sign_in_failed = true;
            }
            UiEvent::StateChanged(snapshot) => {
                // The draft clears only once the task shows up in a
                // reloaded list; a rejected submission keeps it editable.
                if snapshot.tasks.len() > self.snapshot.tasks.len() && snapshot.alert.is_none() {
                    self.clear_inputs();
                }
                self.snapshot = snapshot;
                self.clamp_selection();
            }
        }
    }

    /// Id of the task the cursor is on, if any.
    #[must_use]
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.snapshot.tasks.get(self.selected_task).map(|t| t.id.clone())
    }

    fn handle_sign_in_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Enter => {
                if self.signing_in {
                    return None;
                }
                self.signing_in = true;
                self.sign_in_failed = false;
                Some(UiCommand::SignIn {
                    code: self.code_input.clone(),
                })
            }
            KeyCode::Char(c) => {
                self.code_input.push(c);
                None
            }
            KeyCode::Backspace => {
                self.code_input.pop();
                None
            }
            _ => None,
        }
    }

    fn handle_tasks_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        // View-wide shortcuts first
        match (key.code, key.modifiers) {
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => {
                self.reset_inputs();
                self.view = View::SignIn;
                self.profile = None;
                return Some(UiCommand::LogOut);
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                return Some(UiCommand::Reload);
            }
            (KeyCode::Tab | KeyCode::BackTab, _) => {
                self.cycle_focus();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::TextInput => self.handle_text_input_key(key),
            Focus::DueInput => self.handle_due_input_key(key),
            Focus::TaskList => self.handle_task_list_key(key),
        }
    }

    fn handle_text_input_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => {
                let at = byte_index(&self.text_input, self.text_cursor);
                self.text_input.insert(at, c);
                self.text_cursor += 1;
                None
            }
            KeyCode::Backspace => {
                if self.text_cursor > 0 {
                    self.text_cursor -= 1;
                    let at = byte_index(&self.text_input, self.text_cursor);
                    self.text_input.remove(at);
                }
                None
            }
            KeyCode::Left => {
                self.text_cursor = self.text_cursor.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                if self.text_cursor < self.text_input.chars().count() {
                    self.text_cursor += 1;
                }
                None
            }
            KeyCode::Home => {
                self.text_cursor = 0;
                None
            }
            KeyCode::End => {
                self.text_cursor = self.text_input.chars().count();
                None
            }
            _ => None,
        }
    }

    fn handle_due_input_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => {
                self.due_input.push(c);
                None
            }
            KeyCode::Backspace => {
                self.due_input.pop();
                None
            }
            _ => None,
        }
    }

    fn handle_task_list_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_task = self.selected_task.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.snapshot.tasks.len().saturating_sub(1);
                if self.selected_task < last {
                    self.selected_task += 1;
                }
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => self
                .selected_task_id()
                .map(|task_id| UiCommand::Toggle { task_id }),
            KeyCode::Char('d') | KeyCode::Delete => self
                .selected_task_id()
                .map(|task_id| UiCommand::Delete { task_id }),
            _ => None,
        }
    }

    /// Submit the input fields as-is; the controller's gate does the
    /// validating, the inputs are cleared only on visible success.
    fn submit(&mut self) -> Option<UiCommand> {
        Some(UiCommand::Submit {
            text: self.text_input.clone(),
            due_date: self.due_input.trim().to_string(),
        })
    }

    /// Clear the drafting inputs after a task shows up in the list.
    pub fn clear_inputs(&mut self) {
        self.text_input.clear();
        self.text_cursor = 0;
        self.due_input.clear();
    }

    fn reset_inputs(&mut self) {
        self.clear_inputs();
        self.selected_task = 0;
        self.focus = Focus::TextInput;
    }

    /// Cycle focus: text -> due date -> list -> text.
    const fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::TextInput => Focus::DueInput,
            Focus::DueInput => Focus::TaskList,
            Focus::TaskList => Focus::TextInput,
        };
    }

    fn clamp_selection(&mut self) {
        let last = self.snapshot.tasks.len().saturating_sub(1);
        if self.selected_task > last {
            self.selected_task = last;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of the `char_index`-th character.
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(i, _)| i)
}
