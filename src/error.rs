//! Centralized error types for cellchat.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the cellchat library.
#[derive(Error, Debug)]
pub enum CellchatError {
    /// I/O error with the associated file path.
    #[error("I/O error accessing '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The string is not a valid `mxc://server/id` content URI.
    #[error("Invalid content URI: {0}")]
    InvalidContentUri(String),

    /// An operation needed a content URI but got an empty one.
    #[error("Empty content URI")]
    EmptyContentUri,

    /// The media blob is not present in the local cache.
    #[error("Media not cached: {0}")]
    NotCached(String),

    /// The image bytes could not be decoded.
    #[error("Image decoding error: {0}")]
    Decode(String),

    /// An invalid path was provided.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for `Result<T, CellchatError>`.
pub type Result<T> = std::result::Result<T, CellchatError>;

impl CellchatError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<image::ImageError> for CellchatError {
    fn from(source: image::ImageError) -> Self {
        Self::Decode(source.to_string())
    }
}
