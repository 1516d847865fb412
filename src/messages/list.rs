//! An ordered, scrollable list of messages.
//!
//! The list owns its messages and is only touched from the UI thread.
//! Preview downloads run in the background through a [`PreviewQueue`];
//! [`MessageList::poll_previews`] applies finished ones and relays out the
//! affected messages. Results for messages evicted in the meantime are
//! dropped.

use std::collections::HashSet;
use std::time::Duration;

use ratatui::style::Color;
use tracing::debug;

use super::{AttachmentMessage, Message};
use crate::media::{PreviewFetcher, PreviewQueue, PreviewResult};
use crate::model::event::AttachmentEvent;
use crate::render::{RenderPreferences, Screen};

/// Blank rows between consecutive messages.
const MESSAGE_GAP: usize = 1;

struct Entry {
    id: u64,
    message: Message,
}

/// Messages in arrival order plus their layout state.
pub struct MessageList {
    entries: Vec<Entry>,
    next_id: u64,
    prefs: RenderPreferences,
    width: usize,
    queue: PreviewQueue,
    /// Messages whose preview has already been requested.
    requested: HashSet<u64>,
}

impl MessageList {
    pub fn new(fetcher: PreviewFetcher, prefs: RenderPreferences) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            prefs,
            width: 0,
            queue: PreviewQueue::new(fetcher),
            requested: HashSet::new(),
        }
    }

    pub fn fetcher(&self) -> &PreviewFetcher {
        self.queue.fetcher()
    }

    /// Append a message and return its id.
    pub fn push(&mut self, message: impl Into<Message>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let mut message = message.into();
        if self.width > 0 {
            message.lay_out(self.prefs, self.width);
        }
        self.entries.push(Entry { id, message });
        id
    }

    /// Build an attachment from `event` and append it.
    pub fn push_event(&mut self, event: &AttachmentEvent) -> u64 {
        let message = AttachmentMessage::new(self.fetcher().clone(), event);
        self.push(message)
    }

    /// Remove a message. A preview download still running for it is
    /// discarded when it finishes.
    pub fn evict(&mut self, id: u64) -> Option<Message> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        self.requested.remove(&id);
        Some(self.entries.remove(pos).message)
    }

    pub fn get(&self, id: u64) -> Option<&Message> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages with their ids, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Message)> {
        self.entries.iter().map(|e| (e.id, &e.message))
    }

    pub fn prefs(&self) -> RenderPreferences {
        self.prefs
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Change the render preferences and relay everything out.
    pub fn set_prefs(&mut self, prefs: RenderPreferences) {
        if prefs != self.prefs {
            self.prefs = prefs;
            self.lay_out_all();
        }
    }

    /// Change the available width (e.g. on resize) and relay out.
    pub fn set_width(&mut self, width: usize) {
        if width != self.width {
            self.width = width;
            self.lay_out_all();
        }
    }

    fn lay_out_all(&mut self) {
        let (prefs, width) = (self.prefs, self.width);
        for entry in &mut self.entries {
            entry.message.lay_out(prefs, width);
        }
    }

    /// Start background downloads for previews that have not been requested.
    ///
    /// Does nothing while images are disabled. Returns how many downloads
    /// were started.
    pub fn request_previews(&mut self) -> usize {
        if !self.prefs.allows_images() {
            return 0;
        }
        let mut started = 0;
        for entry in &self.entries {
            if self.requested.contains(&entry.id) {
                continue;
            }
            let Some(attachment) = entry.message.as_attachment() else {
                continue;
            };
            if attachment.bytes().is_some() {
                continue;
            }
            let Some(uri) = attachment.preview_uri() else {
                continue;
            };
            if self.queue.dispatch(entry.id, uri.clone()) {
                self.requested.insert(entry.id);
                started += 1;
            }
        }
        started
    }

    /// Apply every finished download. Returns how many messages changed.
    pub fn poll_previews(&mut self) -> usize {
        let mut changed = 0;
        for result in self.queue.poll() {
            if self.apply_result(result) {
                changed += 1;
            }
        }
        changed
    }

    /// Block up to `timeout` for one download and apply it.
    ///
    /// Not for the UI thread; used for one-shot rendering and tests.
    pub fn wait_for_preview(&mut self, timeout: Duration) -> bool {
        match self.queue.wait(timeout) {
            Some(result) => self.apply_result(result),
            None => false,
        }
    }

    /// Downloads dispatched but not yet applied.
    pub fn pending_previews(&self) -> usize {
        self.queue.pending()
    }

    fn apply_result(&mut self, result: PreviewResult) -> bool {
        let (prefs, width) = (self.prefs, self.width);
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == result.id) else {
            debug!(id = result.id, uri = %result.uri, "Discarding preview for evicted message");
            return false;
        };
        let Some(attachment) = entry.message.as_attachment_mut() else {
            return false;
        };
        let changed = attachment.apply_preview(&result.uri, result.outcome);
        if changed {
            entry.message.lay_out(prefs, width);
        }
        changed
    }

    /// Total rows needed to draw every message.
    pub fn total_height(&self) -> usize {
        let rows: usize = self.entries.iter().map(|e| e.message.height()).sum();
        rows + MESSAGE_GAP * self.entries.len().saturating_sub(1)
    }

    /// Notification line of the newest message.
    pub fn latest_notification(&self) -> Option<&str> {
        self.entries.last().map(|e| e.message.notification_line())
    }

    /// Draw the stacked messages, skipping the first `scroll` rows.
    pub fn draw(&self, screen: &mut dyn Screen, scroll: usize) {
        let mut scrolled = Scrolled {
            inner: screen,
            skip: scroll,
        };
        let mut y = 0usize;
        for entry in &self.entries {
            let Ok(origin) = u16::try_from(y) else {
                break;
            };
            entry.message.draw(&mut scrolled, origin);
            y += entry.message.height() + MESSAGE_GAP;
        }
    }
}

/// A screen view that hides the first `skip` rows.
struct Scrolled<'a> {
    inner: &'a mut dyn Screen,
    skip: usize,
}

impl Screen for Scrolled<'_> {
    fn set_cell(&mut self, x: u16, y: u16, symbol: &str, fg: Color, bg: Color) {
        let y = usize::from(y);
        if y < self.skip {
            return;
        }
        if let Ok(y) = u16::try_from(y - self.skip) {
            self.inner.set_cell(x, y, symbol, fg, bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};

    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    use super::*;
    use crate::error::Result;
    use crate::media::MediaContainer;
    use crate::messages::TextMessage;
    use crate::model::content_uri::ContentUri;
    use crate::model::event::AttachmentKind;
    use crate::render::cells::UPPER_HALF;
    use crate::render::ColorDepth;

    /// Serves one PNG for every URI, but only after the test opens the gate.
    struct GatedMedia {
        gate: Mutex<Receiver<()>>,
        png: Vec<u8>,
    }

    impl MediaContainer for GatedMedia {
        fn download(&self, _uri: &ContentUri) -> Result<Vec<u8>> {
            self.gate.lock().unwrap().recv().unwrap();
            Ok(self.png.clone())
        }
        fn download_url(&self, uri: &ContentUri) -> Result<String> {
            Ok(format!("https://{}/dl/{}", uri.homeserver, uri.file_id))
        }
        fn cache_path(&self, _uri: &ContentUri) -> Result<PathBuf> {
            Ok(PathBuf::new())
        }
    }

    fn gated_list() -> (MessageList, Sender<()>) {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([255, 0, 0, 255])))
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        let (open, gate) = mpsc::channel();
        let media = Arc::new(GatedMedia {
            gate: Mutex::new(gate),
            png: cursor.into_inner(),
        });
        let prefs = RenderPreferences {
            color_depth: ColorDepth::TrueColor,
            ..Default::default()
        };
        let mut list = MessageList::new(PreviewFetcher::new(media), prefs);
        list.set_width(40);
        (list, open)
    }

    fn image_event() -> AttachmentEvent {
        AttachmentEvent {
            kind: AttachmentKind::Image,
            body: "cat.png".to_string(),
            url: "mxc://s/ct".to_string(),
            thumbnail_url: String::new(),
        }
    }

    #[test]
    fn test_layout_uses_fallback_until_preview_arrives() {
        let (mut list, open) = gated_list();
        let id = list.push_event(&image_event());
        assert_eq!(list.request_previews(), 1);
        assert_eq!(list.poll_previews(), 0);
        assert_eq!(list.get(id).unwrap().height(), 1);

        open.send(()).unwrap();
        assert!(list.wait_for_preview(Duration::from_secs(5)));
        let attachment = list.get(id).unwrap().as_attachment().unwrap();
        assert!(attachment.bytes().is_some());

        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 2));
        list.draw(&mut buf, 0);
        assert_eq!(buf[(0, 0)].symbol(), UPPER_HALF);
    }

    #[test]
    fn test_previews_are_requested_once() {
        let (mut list, open) = gated_list();
        list.push_event(&image_event());
        assert_eq!(list.request_previews(), 1);
        assert_eq!(list.request_previews(), 0);
        open.send(()).unwrap();
        list.wait_for_preview(Duration::from_secs(5));
        assert_eq!(list.request_previews(), 0);
    }

    #[test]
    fn test_evicted_message_discards_result() {
        let (mut list, open) = gated_list();
        let id = list.push_event(&image_event());
        list.request_previews();
        let evicted = list.evict(id).unwrap();

        open.send(()).unwrap();
        assert!(!list.wait_for_preview(Duration::from_secs(5)));
        assert!(list.get(id).is_none());
        assert!(evicted.as_attachment().unwrap().bytes().is_none());
    }

    #[test]
    fn test_disabled_images_skip_requests() {
        let (mut list, _open) = gated_list();
        list.set_prefs(RenderPreferences {
            disable_images: true,
            ..list.prefs()
        });
        list.push_event(&image_event());
        assert_eq!(list.request_previews(), 0);
    }

    #[test]
    fn test_stacking_and_scroll() {
        let (mut list, _open) = gated_list();
        list.push(TextMessage::new("first"));
        list.push(TextMessage::new("second"));
        assert_eq!(list.total_height(), 3);
        assert_eq!(list.latest_notification(), Some("second"));

        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 3));
        list.draw(&mut buf, 0);
        assert_eq!(buf[(0, 0)].symbol(), "f");
        assert_eq!(buf[(0, 2)].symbol(), "s");

        let mut scrolled = Buffer::empty(Rect::new(0, 0, 10, 3));
        list.draw(&mut scrolled, 2);
        assert_eq!(scrolled[(0, 0)].symbol(), "s");
    }

    #[test]
    fn test_resize_relays_out() {
        let (mut list, _open) = gated_list();
        let id = list.push(TextMessage::new("one two three four"));
        assert_eq!(list.get(id).unwrap().height(), 1);
        list.set_width(9);
        assert_eq!(list.get(id).unwrap().height(), 3);
    }
}
