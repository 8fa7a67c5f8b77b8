//! Content sources: where opaque picker URIs get resolved to bytes.

use std::io::Read;
use std::path::PathBuf;

use crate::ContentError;

/// Resolves opaque content URIs to byte streams and metadata.
///
/// This is the seam to the host platform's content-resolution service.
/// Implementations are injected into the pipeline; nothing reaches into
/// ambient platform state.
pub trait ContentSource: Send + Sync + 'static {
    /// Opens the content stream behind `uri`.
    ///
    /// A missing or revoked handle fails with
    /// [`ContentError::Unreadable`].
    fn open(&self, uri: &str) -> Result<Box<dyn Read + Send>, ContentError>;

    /// Queries the display name recorded for `uri`, if any.
    fn display_name(&self, uri: &str) -> Option<String>;

    /// Queries the declared MIME type for `uri`, if any.
    fn mime_type(&self, uri: &str) -> Option<String>;
}

/// Filesystem-backed content source.
///
/// Accepts plain paths and `file://` URIs. The filesystem keeps no
/// display metadata, so name and MIME resolution fall through to the
/// reader's path-segment and extension policies.
#[derive(Debug, Default)]
pub struct FsContentSource;

impl FsContentSource {
    pub fn new() -> Self {
        Self
    }

    fn path_for(uri: &str) -> PathBuf {
        PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
    }
}

impl ContentSource for FsContentSource {
    fn open(&self, uri: &str) -> Result<Box<dyn Read + Send>, ContentError> {
        let path = Self::path_for(uri);
        let file = std::fs::File::open(&path)
            .map_err(|e| ContentError::Unreadable(format!("{uri}: {e}")))?;
        Ok(Box::new(file))
    }

    fn display_name(&self, _uri: &str) -> Option<String> {
        None
    }

    fn mime_type(&self, _uri: &str) -> Option<String> {
        None
    }
}
