//! Background preview downloads.
//!
//! Downloads block, so they run on worker threads. Results travel back over
//! a channel and are picked up by the UI thread with [`PreviewQueue::poll`];
//! nothing on the UI side ever waits for a fetch.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::PreviewFetcher;
use crate::error::Result;
use crate::model::content_uri::ContentUri;

/// The outcome of one background download.
#[derive(Debug)]
pub struct PreviewResult {
    /// Id of the message that asked for the preview.
    pub id: u64,
    pub uri: ContentUri,
    pub outcome: Result<Vec<u8>>,
}

/// Dispatches preview downloads and collects their results.
pub struct PreviewQueue {
    fetcher: PreviewFetcher,
    tx: Sender<PreviewResult>,
    rx: Receiver<PreviewResult>,
    in_flight: HashSet<u64>,
}

impl PreviewQueue {
    pub fn new(fetcher: PreviewFetcher) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            tx,
            rx,
            in_flight: HashSet::new(),
        }
    }

    /// The fetcher downloads run through.
    pub fn fetcher(&self) -> &PreviewFetcher {
        &self.fetcher
    }

    /// Start downloading `uri` for message `id`.
    ///
    /// Returns `false` if a download for `id` is already running or the
    /// worker thread could not be started.
    pub fn dispatch(&mut self, id: u64, uri: ContentUri) -> bool {
        if self.in_flight.contains(&id) {
            return false;
        }

        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("preview-{id}"))
            .spawn(move || {
                debug!(id, uri = %uri, "Loading file");
                let outcome = fetcher.download(&uri);
                // The receiver is gone if the view was dropped; nothing to do.
                let _ = tx.send(PreviewResult { id, uri, outcome });
            });

        match spawned {
            Ok(_) => {
                self.in_flight.insert(id);
                true
            }
            Err(e) => {
                warn!(id, error = %e, "Failed to start preview download");
                false
            }
        }
    }

    /// `true` while a download for `id` has not been collected yet.
    pub fn is_in_flight(&self, id: u64) -> bool {
        self.in_flight.contains(&id)
    }

    /// Number of downloads not yet collected.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Collect every finished download without blocking.
    pub fn poll(&mut self) -> Vec<PreviewResult> {
        let results: Vec<PreviewResult> = self.rx.try_iter().collect();
        for r in &results {
            self.in_flight.remove(&r.id);
        }
        results
    }

    /// Wait up to `timeout` for the next finished download.
    ///
    /// For callers off the UI thread (tests, one-shot rendering).
    pub fn wait(&mut self, timeout: Duration) -> Option<PreviewResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => {
                self.in_flight.remove(&result.id);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
