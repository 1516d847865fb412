//! Renderable chat messages.
//!
//! Every message kind supports the same operations: a notification line, a
//! plain-text form, a width-dependent layout into [`StyledRow`]s, its height
//! in rows, and drawing onto a [`Screen`]. [`Message`] dispatches them.

pub mod attachment;
pub mod list;
pub mod text;

use ratatui::style::Color;

use crate::model::content_uri::ContentUri;
use crate::render::wrap::wrap_text;
use crate::render::{RenderPreferences, Screen, StyledRow};

pub use attachment::AttachmentMessage;
pub use list::MessageList;
pub use text::TextMessage;

/// Everything a cached layout depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayoutKey {
    pub width: usize,
    pub prefs: RenderPreferences,
    /// Bumped whenever the message content that feeds the layout changes.
    pub generation: u64,
}

/// A laid-out message, valid for `key`.
#[derive(Debug, Clone)]
pub(crate) struct LayoutCache {
    pub key: LayoutKey,
    pub rows: Vec<StyledRow>,
}

/// Word-wrap `text` into rows of at most `width` columns in one colour.
pub(crate) fn wrap_rows(text: &str, width: usize, fg: Color) -> Vec<StyledRow> {
    wrap_text(text, width)
        .iter()
        .map(|line| StyledRow::from_text(line, fg, Color::Reset, width))
        .collect()
}

/// Draw cached rows at `(0, origin_y + i)`.
pub(crate) fn draw_rows(rows: &[StyledRow], screen: &mut dyn Screen, origin_y: u16) {
    for (i, row) in rows.iter().enumerate() {
        let Ok(offset) = u16::try_from(i) else {
            break;
        };
        row.draw(screen, 0, origin_y.saturating_add(offset));
    }
}

/// Any message the list can show.
#[derive(Debug, Clone)]
pub enum Message {
    Text(TextMessage),
    Attachment(AttachmentMessage),
}

impl Message {
    /// One-line summary for notifications.
    pub fn notification_line(&self) -> &str {
        match self {
            Self::Text(m) => m.notification_line(),
            Self::Attachment(m) => m.notification_line(),
        }
    }

    /// Plain-text form for copying.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(m) => m.plain_text(),
            Self::Attachment(m) => m.plain_text(),
        }
    }

    /// Lay the message out for `width` columns and cache the result.
    pub fn lay_out(&mut self, prefs: RenderPreferences, width: usize) -> &[StyledRow] {
        match self {
            Self::Text(m) => m.lay_out(prefs, width),
            Self::Attachment(m) => m.lay_out(prefs, width),
        }
    }

    /// Rows in the cached layout.
    pub fn height(&self) -> usize {
        match self {
            Self::Text(m) => m.height(),
            Self::Attachment(m) => m.height(),
        }
    }

    /// Draw the cached layout starting at row `origin_y`.
    pub fn draw(&self, screen: &mut dyn Screen, origin_y: u16) {
        match self {
            Self::Text(m) => m.draw(screen, origin_y),
            Self::Attachment(m) => m.draw(screen, origin_y),
        }
    }

    /// Blocking preview download. Does nothing for text messages.
    pub fn fetch_preview(&mut self) {
        if let Self::Attachment(m) = self {
            m.fetch_preview();
        }
    }

    /// The URI a preview would be fetched from, if any.
    pub fn preview_uri(&self) -> Option<&ContentUri> {
        match self {
            Self::Text(_) => None,
            Self::Attachment(m) => m.preview_uri(),
        }
    }

    pub fn as_attachment(&self) -> Option<&AttachmentMessage> {
        match self {
            Self::Attachment(m) => Some(m),
            Self::Text(_) => None,
        }
    }

    pub fn as_attachment_mut(&mut self) -> Option<&mut AttachmentMessage> {
        match self {
            Self::Attachment(m) => Some(m),
            Self::Text(_) => None,
        }
    }
}

impl From<TextMessage> for Message {
    fn from(m: TextMessage) -> Self {
        Self::Text(m)
    }
}

impl From<AttachmentMessage> for Message {
    fn from(m: AttachmentMessage) -> Self {
        Self::Attachment(m)
    }
}
