//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Focus};
use crate::controller::AlertSeverity;

/// Render the status bar at the bottom of the screen.
///
/// A pending alert takes over the whole bar until dismissed; otherwise the
/// bar shows the signed-in user and focus-specific key help.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(alert) = &app.snapshot.alert {
        let style = match alert.severity {
            AlertSeverity::Warning => theme::alert_warning(),
            AlertSeverity::Error => theme::alert_error(),
        };
        let line = Line::from(vec![
            Span::raw(" "),
            Span::raw(alert.message.clone()),
            Span::raw("  (Esc: dismiss)"),
        ]);
        frame.render_widget(Paragraph::new(line).style(style), area);
        return;
    }

    let help_text = match app.focus {
        Focus::TextInput | Focus::DueInput => {
            "Enter: add task | Tab: switch focus | Ctrl-L: log out | Esc: quit"
        }
        Focus::TaskList => {
            "↑↓/jk: navigate | Space: toggle | d: delete | Tab: switch focus | Esc: quit"
        }
    };

    let who = app
        .profile
        .as_ref()
        .map_or_else(String::new, |p| p.display_name.clone());

    let line = Line::from(vec![
        Span::styled("TaskDeck", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(theme::SUCCESS)),
        Span::raw(format!(" {who}")),
        Span::raw(" | "),
        Span::styled(help_text, theme::dimmed()),
    ]);

    frame.render_widget(Paragraph::new(line).style(theme::status_bar_bg()), area);
}
