//! Incoming chat events that produce attachment messages.

use std::path::Path;

/// What kind of file an attachment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Audio,
    Video,
    /// Any other file.
    Generic,
}

impl AttachmentKind {
    /// Map a Matrix `msgtype` (e.g. `"m.image"`) to a kind.
    ///
    /// Unknown types are treated as generic files.
    pub fn from_msgtype(msgtype: &str) -> Self {
        match msgtype {
            "m.image" => Self::Image,
            "m.audio" => Self::Audio,
            "m.video" => Self::Video,
            _ => Self::Generic,
        }
    }

    /// Guess the kind from a file extension (used when importing local files).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tif" | "tiff" | "ico" | "pnm"
            | "tga" => Self::Image,
            "mp3" | "ogg" | "oga" | "opus" | "flac" | "wav" | "m4a" => Self::Audio,
            "mp4" | "mkv" | "webm" | "mov" | "avi" => Self::Video,
            _ => Self::Generic,
        }
    }
}

/// The subset of a message event needed to build an attachment.
///
/// URIs are kept as raw strings; an empty string means absent.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AttachmentEvent {
    pub kind: AttachmentKind,
    /// Message body, usually the uploaded file's name.
    pub body: String,
    pub url: String,
    pub thumbnail_url: String,
}
