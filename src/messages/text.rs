//! Plain text messages.

use super::{draw_rows, wrap_rows, LayoutCache, LayoutKey};
use crate::render::halfblock::MIN_WIDTH;
use crate::render::{RenderPreferences, Screen, StyledRow};
use crate::tui::theme::{current_theme, fg_of};

/// A message whose payload is just text.
#[derive(Debug, Clone)]
pub struct TextMessage {
    body: String,
    laid_out: Option<LayoutCache>,
}

impl TextMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            laid_out: None,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn notification_line(&self) -> &str {
        &self.body
    }

    pub fn plain_text(&self) -> String {
        self.body.clone()
    }

    pub fn lay_out(&mut self, prefs: RenderPreferences, width: usize) -> &[StyledRow] {
        let key = LayoutKey {
            width,
            prefs,
            generation: 0,
        };
        let fresh = self.laid_out.as_ref().is_some_and(|c| c.key == key);
        if !fresh {
            let rows = if width < MIN_WIDTH {
                Vec::new()
            } else {
                wrap_rows(&self.body, width, fg_of(current_theme().message_body))
            };
            self.laid_out = Some(LayoutCache { key, rows });
        }
        self.laid_out
            .as_ref()
            .map(|c| c.rows.as_slice())
            .unwrap_or_default()
    }

    pub fn height(&self) -> usize {
        self.laid_out.as_ref().map_or(0, |c| c.rows.len())
    }

    pub fn draw(&self, screen: &mut dyn Screen, origin_y: u16) {
        if let Some(cache) = &self.laid_out {
            draw_rows(&cache.rows, screen, origin_y);
        }
    }
}
