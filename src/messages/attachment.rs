//! File attachment messages (images, audio, video, generic files).
//!
//! Images get an inline half-block preview once their bytes are fetched;
//! everything else, and any image that cannot be shown, falls back to a
//! wrapped `"{caption}: {url}"` line. No operation here returns an error:
//! failures are logged and rendered in a degraded form.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{draw_rows, wrap_rows, LayoutCache, LayoutKey};
use crate::error::Result;
use crate::media::PreviewFetcher;
use crate::model::content_uri::ContentUri;
use crate::model::event::{AttachmentEvent, AttachmentKind};
use crate::render::decode::{ImageDecoder, RasterDecoder};
use crate::render::halfblock::{self, MIN_WIDTH};
use crate::render::{RenderPreferences, Screen, StyledRow};
use crate::tui::theme::{current_theme, fg_of};

/// A message whose payload is a file.
pub struct AttachmentMessage {
    kind: AttachmentKind,
    caption: String,
    source: ContentUri,
    thumbnail: ContentUri,
    /// Preview bytes: the thumbnail if there is one, else the source image.
    bytes: Option<Vec<u8>>,
    /// Bumped every time `bytes` is replaced.
    generation: u64,
    laid_out: Option<LayoutCache>,

    fetcher: PreviewFetcher,
    decoder: Arc<dyn ImageDecoder>,
}

impl AttachmentMessage {
    /// Build a message from an incoming event.
    ///
    /// Malformed URIs are treated as absent, which disables the preview.
    pub fn new(fetcher: PreviewFetcher, event: &AttachmentEvent) -> Self {
        Self::from_parts(
            fetcher,
            event.kind,
            event.body.clone(),
            ContentUri::parse_lenient(&event.url),
            ContentUri::parse_lenient(&event.thumbnail_url),
        )
    }

    /// Build a message from already-parsed parts.
    pub fn from_parts(
        fetcher: PreviewFetcher,
        kind: AttachmentKind,
        caption: impl Into<String>,
        source: ContentUri,
        thumbnail: ContentUri,
    ) -> Self {
        Self {
            kind,
            caption: caption.into(),
            source,
            thumbnail,
            bytes: None,
            generation: 0,
            laid_out: None,
            fetcher,
            decoder: Arc::new(RasterDecoder),
        }
    }

    /// Replace the image decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self.laid_out = None;
        self
    }

    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn source(&self) -> &ContentUri {
        &self.source
    }

    pub fn thumbnail(&self) -> &ContentUri {
        &self.thumbnail
    }

    /// The downloaded preview bytes, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn fetcher(&self) -> &PreviewFetcher {
        &self.fetcher
    }

    pub fn notification_line(&self) -> &'static str {
        match self.kind {
            AttachmentKind::Image => "Sent an image",
            AttachmentKind::Audio => "Sent an audio file",
            AttachmentKind::Video => "Sent a video",
            AttachmentKind::Generic => "Sent a file",
        }
    }

    /// `"{caption}: {download url}"`, or just the caption if the source
    /// has no URL.
    pub fn plain_text(&self) -> String {
        match self.fetcher.download_url(&self.source) {
            Ok(url) => format!("{}: {url}", self.caption),
            Err(e) => {
                debug!(error = %e, "No download URL for attachment");
                self.caption.clone()
            }
        }
    }

    /// The URI a preview is fetched from: the thumbnail, else the source of
    /// an image. `None` when there is nothing to preview.
    pub fn preview_uri(&self) -> Option<&ContentUri> {
        if !self.thumbnail.is_empty() {
            Some(&self.thumbnail)
        } else if self.kind == AttachmentKind::Image && !self.source.is_empty() {
            Some(&self.source)
        } else {
            None
        }
    }

    /// On-disk location of the preview blob.
    pub fn thumbnail_path(&self) -> Option<PathBuf> {
        let uri = self.preview_uri()?;
        self.fetcher.cache_path(uri).ok()
    }

    /// Download the preview and store it. Blocks; never call on the UI thread.
    ///
    /// On failure the current bytes are left untouched.
    pub fn fetch_preview(&mut self) {
        let Some(uri) = self.preview_uri().cloned() else {
            return;
        };
        debug!(uri = %uri, "Loading file");
        let outcome = self.fetcher.download(&uri);
        self.apply_preview(&uri, outcome);
    }

    /// Store the result of a preview download for `uri`.
    ///
    /// Returns `true` if the bytes changed. Results for a URI other than the
    /// current preview URI are ignored.
    pub fn apply_preview(&mut self, uri: &ContentUri, outcome: Result<Vec<u8>>) -> bool {
        if self.preview_uri() != Some(uri) {
            debug!(uri = %uri, "Discarding preview for a stale URI");
            return false;
        }
        match outcome {
            Ok(data) => {
                debug!(uri = %uri, size = data.len(), "File loaded");
                self.set_bytes(data);
                true
            }
            Err(e) => {
                warn!(uri = %uri, error = %e, "Failed to download file");
                false
            }
        }
    }

    /// Replace the preview bytes, invalidating the layout.
    pub fn set_bytes(&mut self, data: Vec<u8>) {
        self.bytes = Some(data);
        self.generation += 1;
        self.laid_out = None;
    }

    /// Lay the message out for `width` columns.
    ///
    /// Narrower than two columns gives an empty layout. The result is cached
    /// and reused until the width, preferences or bytes change.
    pub fn lay_out(&mut self, prefs: RenderPreferences, width: usize) -> &[StyledRow] {
        let key = LayoutKey {
            width,
            prefs,
            generation: self.generation,
        };
        let fresh = self.laid_out.as_ref().is_some_and(|c| c.key == key);
        if !fresh {
            let rows = self.compute_rows(prefs, width);
            self.laid_out = Some(LayoutCache { key, rows });
        }
        self.laid_out
            .as_ref()
            .map(|c| c.rows.as_slice())
            .unwrap_or_default()
    }

    fn compute_rows(&self, prefs: RenderPreferences, width: usize) -> Vec<StyledRow> {
        if width < MIN_WIDTH {
            return Vec::new();
        }

        let bytes = match self.bytes.as_deref() {
            Some(b) if prefs.allows_images() && self.kind == AttachmentKind::Image => b,
            _ => return self.fallback_rows(width),
        };

        match self.decoder.decode(bytes) {
            Ok(image) => halfblock::rasterise(&image, width, prefs.color_depth),
            Err(e) => {
                warn!(error = %e, caption = %self.caption, "Failed to display image");
                vec![halfblock::error_row(width)]
            }
        }
    }

    fn fallback_rows(&self, width: usize) -> Vec<StyledRow> {
        wrap_rows(&self.plain_text(), width, fg_of(current_theme().attachment))
    }

    /// Rows in the cached layout.
    pub fn height(&self) -> usize {
        self.laid_out.as_ref().map_or(0, |c| c.rows.len())
    }

    /// Draw the cached layout starting at row `origin_y`.
    pub fn draw(&self, screen: &mut dyn Screen, origin_y: u16) {
        if let Some(cache) = &self.laid_out {
            draw_rows(&cache.rows, screen, origin_y);
        }
    }
}

impl Clone for AttachmentMessage {
    /// Copies metadata and bytes; the clone lays itself out again on demand.
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            caption: self.caption.clone(),
            source: self.source.clone(),
            thumbnail: self.thumbnail.clone(),
            bytes: self.bytes.clone(),
            generation: self.generation,
            laid_out: None,
            fetcher: self.fetcher.clone(),
            decoder: Arc::clone(&self.decoder),
        }
    }
}

impl fmt::Debug for AttachmentMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentMessage")
            .field("kind", &self.kind)
            .field("body", &self.caption)
            .field("url", &self.source.to_string())
            .field("thumbnail", &self.thumbnail.to_string())
            .field("bytes", &self.bytes.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}
