//! Bottom status bar showing transient messages or keyboard hints.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Version string shown at the right edge of the status bar.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key hints, in display order.
const HINTS: [(&str, &str); 6] = [
    ("j/k", "scroll"),
    ("i", "images"),
    ("b", "bare"),
    ("c", "colours"),
    ("s", "save"),
    ("q", "quit"),
];

/// Render the status bar at the bottom with hints and version.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();

    let version_text = format!("v{VERSION} ");
    let version_width = version_text.len() as u16;

    // Split: hints (flexible) | version (fixed)
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(version_width)])
        .split(area);

    // Left side: status message, else the newest notification plus hints
    let content = if let Some((msg, _)) = &app.status_message {
        Line::from(Span::styled(format!(" {msg}"), theme.status_bar))
    } else {
        let mut spans = Vec::new();
        for (i, (key, desc)) in HINTS.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", theme.status_bar));
            }
            spans.push(Span::styled(format!(" {key}"), theme.status_hint_key));
            spans.push(Span::styled(format!(":{desc}"), theme.status_bar));
        }
        if let Some(latest) = app.messages.latest_notification() {
            spans.push(Span::styled(format!("  | {latest}"), theme.status_bar));
        }
        Line::from(spans)
    };

    let bar = Paragraph::new(content).style(theme.status_bar);
    frame.render_widget(bar, chunks[0]);

    // Right side: version
    let version = Paragraph::new(Line::from(Span::styled(version_text, theme.border)))
        .alignment(Alignment::Right)
        .style(theme.status_bar);
    frame.render_widget(version, chunks[1]);
}
