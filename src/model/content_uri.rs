//! Remote media identifiers (`mxc://server/id`).

use std::fmt;
use std::str::FromStr;

use crate::error::{CellchatError, Result};

const SCHEME: &str = "mxc://";

/// An opaque identifier for a media blob on a homeserver.
///
/// The empty URI (both parts blank) stands for "absent".
///
/// # Examples
/// - `"mxc://example.org/abc123"` → `homeserver = "example.org"`, `file_id = "abc123"`
/// - `""` → the empty URI
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContentUri {
    /// Server that hosts the blob.
    pub homeserver: String,
    /// Server-local media identifier.
    pub file_id: String,
}

impl ContentUri {
    /// Build a URI from its two parts.
    pub fn new(homeserver: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            homeserver: homeserver.into(),
            file_id: file_id.into(),
        }
    }

    /// Parse `mxc://server/id`.
    ///
    /// An empty input yields the empty URI. Anything else that lacks the
    /// scheme, a server, or an id is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let rest = trimmed
            .strip_prefix(SCHEME)
            .ok_or_else(|| CellchatError::InvalidContentUri(raw.to_string()))?;
        let (server, id) = rest
            .split_once('/')
            .ok_or_else(|| CellchatError::InvalidContentUri(raw.to_string()))?;

        if server.is_empty() || id.is_empty() || id.contains('/') {
            return Err(CellchatError::InvalidContentUri(raw.to_string()));
        }

        Ok(Self::new(server, id))
    }

    /// Parse, logging and falling back to the empty URI on error.
    ///
    /// Events from the wire are not trusted to be well formed; a bad URI
    /// only disables the preview path for that message.
    pub fn parse_lenient(raw: &str) -> Self {
        match Self::parse(raw) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed content URI");
                Self::default()
            }
        }
    }

    /// `true` when this URI carries no identifier.
    pub fn is_empty(&self) -> bool {
        self.homeserver.is_empty() || self.file_id.is_empty()
    }
}

impl FromStr for ContentUri {
    type Err = CellchatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "{SCHEME}{}/{}", self.homeserver, self.file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_uri() {
        let uri = ContentUri::parse("mxc://example.org/abc123").unwrap();
        assert_eq!(uri.homeserver, "example.org");
        assert_eq!(uri.file_id, "abc123");
        assert!(!uri.is_empty());
    }

    #[test]
    fn test_parse_empty_is_absent() {
        let uri = ContentUri::parse("").unwrap();
        assert!(uri.is_empty());
        assert_eq!(uri.to_string(), "");
    }

    #[test]
    fn test_parse_rejects_wrong_scheme() {
        assert!(ContentUri::parse("https://example.org/abc").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        assert!(ContentUri::parse("mxc://example.org").is_err());
        assert!(ContentUri::parse("mxc:///abc").is_err());
        assert!(ContentUri::parse("mxc://example.org/").is_err());
        assert!(ContentUri::parse("mxc://example.org/a/b").is_err());
    }

    #[test]
    fn test_parse_lenient_falls_back_to_empty() {
        assert!(ContentUri::parse_lenient("not a uri").is_empty());
    }

    #[test]
    fn test_display_roundtrips() {
        let raw = "mxc://s/ab";
        assert_eq!(raw.parse::<ContentUri>().unwrap().to_string(), raw);
    }
}
