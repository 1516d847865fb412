//! Top header bar showing message count and display settings.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::app::App;
use crate::tui::theme::current_theme;

/// Render the top header bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = current_theme();
    let prefs = app.prefs();

    let total = app.messages.len();
    let pending = app.messages.pending_previews();

    let mut spans = vec![
        Span::styled(" cellchat", theme.header_bar),
        Span::styled(format!(" | {total} messages"), theme.header_bar),
    ];

    if pending > 0 {
        spans.push(Span::styled(
            format!(" | loading {pending}"),
            theme.header_bar,
        ));
    }

    let images = if prefs.disable_images { "off" } else { "on" };
    spans.push(Span::styled(
        format!(" | images: {images}"),
        theme.header_bar,
    ));
    if prefs.bare_mode {
        spans.push(Span::styled(" | bare", theme.header_bar));
    }

    // Right-aligned colour depth
    let left_len: usize = spans.iter().map(Span::width).sum();
    let right_text = format!(" {} ", prefs.color_depth.name());
    let width = area.width as usize;
    if width > left_len + right_text.len() {
        let padding = width - left_len - right_text.len();
        spans.push(Span::styled(" ".repeat(padding), theme.header_bar));
    }
    spans.push(Span::styled(right_text, theme.header_bar));

    let line = Line::from(spans);
    let bar = Paragraph::new(line).style(theme.header_bar);
    frame.render_widget(bar, area);
}
