//! Color theme definitions for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Colour of the row shown when an image fails to render.
pub const ERROR_COLOR: Color = Color::Red;

/// A complete color theme for the TUI.
pub struct Theme {
    pub header_bar: Style,
    pub status_bar: Style,
    pub status_hint_key: Style,
    pub message_body: Style,
    pub attachment: Style,
    pub border: Style,
}

impl Theme {
    /// Dark theme (default).
    pub fn dark() -> Self {
        Self {
            header_bar: Style::default()
                .fg(Color::Rgb(200, 200, 220))
                .bg(Color::Rgb(30, 30, 46)),
            status_bar: Style::default()
                .fg(Color::Rgb(150, 150, 170))
                .bg(Color::Rgb(30, 30, 46)),
            status_hint_key: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            message_body: Style::default().fg(Color::Rgb(220, 220, 230)),
            attachment: Style::default().fg(Color::Green),
            border: Style::default().fg(Color::Rgb(80, 80, 100)),
        }
    }
}

/// Return the active theme.
pub fn current_theme() -> Theme {
    Theme::dark()
}

/// The foreground colour of `style`, or the terminal default.
pub fn fg_of(style: Style) -> Color {
    style.fg.unwrap_or(Color::Reset)
}
