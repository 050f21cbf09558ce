//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::theme;
use crate::app::{App, Focus};
use crate::controller::LoadPhase;

/// Render the task list panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == Focus::TaskList;
    let snapshot = &app.snapshot;

    let title = format!(
        "Tasks ({}/{} done)",
        snapshot.completed_count,
        snapshot.tasks.len()
    );
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    if snapshot.phase == LoadPhase::Loading && snapshot.tasks.is_empty() {
        let loading = Paragraph::new(Line::from(Span::styled("Loading...", theme::dimmed())))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let items: Vec<ListItem> = snapshot
        .tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let checkbox = if task.completed { "[✓]" } else { "[ ]" };
            let style = if is_focused && i == app.selected_task {
                theme::selected()
            } else if task.completed {
                theme::completed()
            } else {
                theme::normal()
            };

            let created = format_created(task.created_at_ms, &app.timestamp_format);
            let line = Line::from(vec![
                Span::styled(checkbox, style),
                Span::raw(" "),
                Span::styled(task.text.clone(), style),
                Span::raw("  "),
                Span::styled(format!("due {}", task.due_date), theme::dimmed()),
                Span::raw("  "),
                Span::styled(created, theme::dimmed()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

/// Format a creation timestamp for display; blank if out of range.
fn format_created(created_at_ms: u64, format: &str) -> String {
    i64::try_from(created_at_ms)
        .ok()
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| dt.format(format).to_string())
        .unwrap_or_default()
}
