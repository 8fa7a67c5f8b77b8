//! Content-handle resolution and payload acquisition.
//!
//! A [`ContentSource`] turns an opaque picker URI into a byte stream plus
//! queryable metadata; the [`reader`] module drains that stream into a
//! [`FilePayload`] (spilling large files to disk) and resolves the
//! payload's display name and MIME type.

pub mod reader;
mod source;

pub use reader::{FilePayload, PayloadData, ReaderOptions};
pub use source::{ContentSource, FsContentSource};

/// Generic binary content type, used whenever nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Errors produced while resolving a content handle.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("unreadable content handle: {0}")]
    Unreadable(String),

    #[error("no resolvable file name")]
    NoName,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    /// Machine-readable failure reason for the bridge error contract.
    pub fn reason(&self) -> &'static str {
        match self {
            ContentError::Unreadable(_) => "unreadable",
            ContentError::NoName => "no-name",
            ContentError::Io(_) => "io",
        }
    }
}
