//! Main render function that dispatches to widgets.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use super::app::App;
use super::widgets;

/// Render the entire TUI frame.
pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    // Vertical layout: header (1) + content (flex) + status (1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header bar
            Constraint::Min(3),    // messages
            Constraint::Length(1), // status bar
        ])
        .split(size);

    widgets::header_bar::render(frame, app, vertical[0]);
    widgets::message_view::render(frame, app, vertical[1]);
    widgets::status_bar::render(frame, app, vertical[2]);
}
