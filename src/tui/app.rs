//! Global application state for the TUI (the "Model" in Elm architecture).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{self, Config};
use crate::media::{MediaCache, PreviewFetcher};
use crate::messages::{MessageList, TextMessage};
use crate::render::RenderPreferences;

/// Seconds a status message stays visible.
const STATUS_TIMEOUT_SECS: u64 = 5;

/// Complete TUI state.
pub struct App {
    // ── Data ──────────────────────────────────
    /// Messages shown in the view, one per opened file.
    pub messages: MessageList,
    /// Loaded configuration; display toggles are written back here.
    pub config: Config,

    // ── Navigation ────────────────────────────
    /// Rows scrolled off the top of the message view.
    pub scroll: usize,
    /// Cached viewport height for the message view (set during render).
    pub viewport_height: usize,

    // ── Lifecycle ─────────────────────────────
    pub should_quit: bool,
    /// Transient status message and the instant it was set.
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Import `files` into the media cache and build one message per file.
    ///
    /// Files that cannot be read become a text message describing the error.
    pub fn new(files: &[PathBuf], config: Config) -> anyhow::Result<Self> {
        let cache = MediaCache::new(
            config.media.homeserver_url.clone(),
            config::cache_dir(&config),
        );
        let fetcher = PreviewFetcher::new(Arc::new(cache.clone()));
        let mut messages = MessageList::new(fetcher, config.display.render_preferences());

        for path in files {
            match cache.import_event(path) {
                Ok(event) => {
                    messages.push_event(&event);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not open file");
                    messages.push(TextMessage::new(format!(
                        "Could not open {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        Ok(Self::with_messages(messages, config))
    }

    /// Build the state around an existing message list.
    pub fn with_messages(messages: MessageList, config: Config) -> Self {
        Self {
            messages,
            config,
            scroll: 0,
            viewport_height: 20,
            should_quit: false,
            status_message: None,
        }
    }

    pub fn prefs(&self) -> RenderPreferences {
        self.messages.prefs()
    }

    /// Set a transient status message.
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some((msg.to_string(), Instant::now()));
    }

    /// Called every tick: applies finished previews, starts new ones and
    /// clears expired status messages.
    pub fn tick(&mut self) {
        self.messages.poll_previews();
        self.messages.request_previews();
        self.clamp_scroll();

        if let Some((_, when)) = &self.status_message {
            if when.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
            }
        }
    }

    /// Lay the messages out for a new view size.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.messages.set_width(width);
        self.viewport_height = height;
        self.clamp_scroll();
    }

    fn max_scroll(&self) -> usize {
        self.messages
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll = self.scroll.saturating_add(rows).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll = self.scroll.saturating_sub(rows);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// Show or hide inline image previews.
    pub fn toggle_images(&mut self) {
        let prefs = self.prefs();
        self.apply_prefs(RenderPreferences {
            disable_images: !prefs.disable_images,
            ..prefs
        });
        let msg = if self.prefs().disable_images {
            "Images disabled"
        } else {
            "Images enabled"
        };
        self.set_status(msg);
    }

    /// Switch between the full and the bare message view.
    pub fn toggle_bare_mode(&mut self) {
        let prefs = self.prefs();
        self.apply_prefs(RenderPreferences {
            bare_mode: !prefs.bare_mode,
            ..prefs
        });
        let msg = if self.prefs().bare_mode {
            "Bare view"
        } else {
            "Full view"
        };
        self.set_status(msg);
    }

    /// Step to the next colour depth.
    pub fn cycle_color_depth(&mut self) {
        let prefs = self.prefs();
        let depth = prefs.color_depth.next();
        self.apply_prefs(RenderPreferences {
            color_depth: depth,
            ..prefs
        });
        self.set_status(&format!("Colour depth: {}", depth.name()));
    }

    fn apply_prefs(&mut self, prefs: RenderPreferences) {
        self.messages.set_prefs(prefs);
        self.config.display.bare_message_view = prefs.bare_mode;
        self.config.display.disable_images = prefs.disable_images;
        self.config.display.color_depth = prefs.color_depth.name().to_string();
        self.clamp_scroll();
    }

    /// Persist the current display settings.
    pub fn save_settings(&mut self) {
        match config::save_config(&self.config) {
            Ok(()) => self.set_status("Settings saved"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save config");
                self.set_status(&format!("Could not save settings: {e}"));
            }
        }
    }
}
