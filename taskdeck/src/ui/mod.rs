//! Terminal UI rendering.

pub mod input_bar;
pub mod sign_in;
pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::{App, View};

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    if app.view == View::SignIn {
        sign_in::render(frame, frame.area(), app);
        return;
    }

    // Input row on top, task list in the middle, status bar at the bottom
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    input_bar::render(frame, chunks[0], app);
    task_panel::render(frame, chunks[1], app);
    status_bar::render(frame, chunks[2], app);
}
