//! File-backed media store.
//!
//! Blobs live at `{cache_dir}/media/{server}/{id}`. Nothing is fetched over
//! the network; a blob that is not on disk is reported as not cached.

use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

use super::MediaContainer;
use crate::error::{CellchatError, Result};
use crate::model::content_uri::ContentUri;
use crate::model::event::{AttachmentEvent, AttachmentKind};

/// Server name used for files imported from the local filesystem.
pub const LOCAL_SERVER: &str = "local";

/// Path of the download endpoint, relative to the homeserver URL.
const DOWNLOAD_ENDPOINT: &str = "/_matrix/media/r0/download";

/// A media store that serves blobs from a directory on disk.
#[derive(Debug, Clone)]
pub struct MediaCache {
    homeserver_url: String,
    cache_dir: PathBuf,
}

impl MediaCache {
    /// Create a store rooted at `cache_dir`, building download URLs against
    /// `homeserver_url` (e.g. `"https://matrix.example.org"`).
    pub fn new(homeserver_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        let homeserver_url = homeserver_url.into().trim_end_matches('/').to_string();
        Self {
            homeserver_url,
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Copy a local file into the store and return its content URI.
    ///
    /// The file is stored under the [`LOCAL_SERVER`] homeserver with an id
    /// percent-encoded from its file name. Re-importing a file with the same
    /// name replaces the existing blob.
    pub fn import(&self, path: &Path) -> Result<ContentUri> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| CellchatError::InvalidPath(path.display().to_string()))?;
        let uri = ContentUri::new(LOCAL_SERVER, sanitize_media_id(&name));

        let data = std::fs::read(path).map_err(|e| CellchatError::io(path, e))?;
        let dest = self.cache_path(&uri)?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CellchatError::io(parent, e))?;
        }
        std::fs::write(&dest, data).map_err(|e| CellchatError::io(&dest, e))?;

        debug!(src = %path.display(), uri = %uri, "Imported file into media cache");
        Ok(uri)
    }

    /// Import a local file and describe it as an attachment event.
    ///
    /// The kind comes from the file extension and the body is the file name.
    pub fn import_event(&self, path: &Path) -> Result<AttachmentEvent> {
        let uri = self.import(path)?;
        let body = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(AttachmentEvent {
            kind: AttachmentKind::from_path(path),
            body,
            url: uri.to_string(),
            thumbnail_url: String::new(),
        })
    }
}

impl MediaContainer for MediaCache {
    fn download(&self, uri: &ContentUri) -> Result<Vec<u8>> {
        let path = self.cache_path(uri)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CellchatError::NotCached(uri.to_string()))
            }
            Err(e) => Err(CellchatError::io(path, e)),
        }
    }

    fn download_url(&self, uri: &ContentUri) -> Result<String> {
        if uri.is_empty() {
            return Err(CellchatError::EmptyContentUri);
        }
        Ok(format!(
            "{}{DOWNLOAD_ENDPOINT}/{}/{}",
            self.homeserver_url, uri.homeserver, uri.file_id
        ))
    }

    fn cache_path(&self, uri: &ContentUri) -> Result<PathBuf> {
        if uri.is_empty() {
            return Err(CellchatError::EmptyContentUri);
        }
        for part in [&uri.homeserver, &uri.file_id] {
            if !is_safe_component(part) {
                return Err(CellchatError::InvalidPath(uri.to_string()));
            }
        }
        Ok(self
            .cache_dir
            .join("media")
            .join(&uri.homeserver)
            .join(&uri.file_id))
    }
}

/// A single path component that cannot escape its parent directory.
fn is_safe_component(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\', '\0'])
}

/// Bytes kept as-is in a media id. Everything else is percent-encoded.
const MEDIA_ID_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

/// Encode a file name as a media id that is safe in both a path and a URI.
///
/// Distinct names give distinct ids. Names made only of dots are encoded in
/// full so they never resolve to `.` or `..`.
fn sanitize_media_id(name: &str) -> String {
    if name.chars().all(|c| c == '.') {
        return "%2E".repeat(name.len());
    }
    utf8_percent_encode(name, MEDIA_ID_SET).to_string()
}
