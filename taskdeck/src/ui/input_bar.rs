//! Task input row rendering (text + due date).

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, Focus};

/// Render the task drafting inputs.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    render_text_input(frame, chunks[0], app);
    render_due_input(frame, chunks[1], app);
}

fn render_text_input(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == Focus::TextInput;

    let mut display_text: String = app.text_input.clone();
    if is_focused {
        let at = app
            .text_input
            .char_indices()
            .nth(app.text_cursor)
            .map_or(display_text.len(), |(i, _)| i);
        display_text.insert(at, '█');
    }

    let line = if display_text.is_empty() {
        Line::from(Span::styled("What needs doing?", theme::dimmed()))
    } else {
        Line::from(Span::styled(display_text, theme::normal()))
    };

    let block = Block::default()
        .title("New task")
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_due_input(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == Focus::DueInput;

    let mut display_text = app.due_input.clone();
    if is_focused {
        display_text.push('█');
    }

    let line = if display_text.is_empty() {
        Line::from(Span::styled("Due (YYYY-MM-DD)", theme::dimmed()))
    } else {
        Line::from(Span::styled(display_text, theme::normal()))
    };

    let block = Block::default()
        .title("Due date")
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(Paragraph::new(line).block(block), area);
}
