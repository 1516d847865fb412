//! Access to remote media blobs.
//!
//! The [`MediaContainer`] trait is the seam to whatever actually stores and
//! serves media. Messages only ever see it through a [`PreviewFetcher`].

pub mod cache;
pub mod queue;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::model::content_uri::ContentUri;

pub use cache::MediaCache;
pub use queue::{PreviewQueue, PreviewResult};

/// A long-lived media service shared by every message.
pub trait MediaContainer: Send + Sync {
    /// Fetch the blob behind `uri`. May block on network or disk.
    fn download(&self, uri: &ContentUri) -> Result<Vec<u8>>;

    /// The user-facing URL for `uri`.
    fn download_url(&self, uri: &ContentUri) -> Result<String>;

    /// Where the blob for `uri` lives (or would live) on disk.
    fn cache_path(&self, uri: &ContentUri) -> Result<PathBuf>;
}

/// Cheap, cloneable handle that forwards to a shared [`MediaContainer`].
#[derive(Clone)]
pub struct PreviewFetcher {
    media: Arc<dyn MediaContainer>,
}

impl PreviewFetcher {
    pub fn new(media: Arc<dyn MediaContainer>) -> Self {
        Self { media }
    }

    pub fn download(&self, uri: &ContentUri) -> Result<Vec<u8>> {
        self.media.download(uri)
    }

    pub fn download_url(&self, uri: &ContentUri) -> Result<String> {
        self.media.download_url(uri)
    }

    pub fn cache_path(&self, uri: &ContentUri) -> Result<PathBuf> {
        self.media.cache_path(uri)
    }

    /// `true` if both handles point at the same media service.
    pub fn shares_media_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.media, &other.media)
    }
}

impl std::fmt::Debug for PreviewFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewFetcher").finish_non_exhaustive()
    }
}
