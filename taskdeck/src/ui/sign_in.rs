//! Sign-in view rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::App;

/// Render the unauthenticated sign-in view.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(rows[1]);

    let mut display_text = app.code_input.clone();
    display_text.push('█');

    let block = Block::default()
        .title(Span::styled("Sign in", theme::panel_title(theme::HIGHLIGHT)))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    let input = Paragraph::new(Line::from(Span::styled(display_text, theme::normal())))
        .block(block);
    frame.render_widget(input, cols[1]);

    let hint = if app.signing_in {
        Line::from(Span::styled("Signing in...", theme::dimmed()))
    } else if app.sign_in_failed {
        Line::from(Span::styled(
            "Sign-in failed. Check your credential and try again.",
            theme::normal().fg(theme::ERROR),
        ))
    } else {
        Line::from(Span::styled(
            "Enter your credential, then press Enter",
            theme::dimmed(),
        ))
    };

    let hint_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(rows[2]);
    frame.render_widget(Paragraph::new(hint), hint_cols[1]);
}
