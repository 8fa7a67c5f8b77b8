use std::future::Future;
use std::pin::Pin;

use airlift_protocol::types::FileReference;

/// MIME filter the media pickers are opened with.
pub const DEFAULT_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/webm",
];

/// Errors from the host's picker integration.
///
/// Cancellation is not an error; a cancelled pick resolves to
/// `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum PickError {
    #[error("picker unavailable: {0}")]
    Unavailable(String),

    #[error("picker failed: {0}")]
    Host(String),
}

/// A boxed future returned by [`MediaPicker::pick`].
pub type PickFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<FileReference>, PickError>> + Send + 'a>>;

/// The OS-level content picker the bridge does not implement itself.
///
/// Shell adapters bridge this to their platform's picker (an Android
/// `GET_CONTENT` intent, a desktop file dialog, ...). `Ok(None)` means
/// the user dismissed the picker.
pub trait MediaPicker: Send + Sync + 'static {
    /// Shows a picker filtered to the given MIME types and returns the
    /// selected content reference, if any.
    fn pick(&self, mime_types: Vec<String>) -> PickFuture<'_>;
}
