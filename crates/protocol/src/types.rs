use serde::{Deserialize, Serialize};

/// Opaque reference to a user-selected file.
///
/// Produced by the host's content picker; the `uri` is only meaningful
/// to the content source that resolves it. Display name and MIME type
/// are whatever metadata the picker already had; both may be absent and
/// are re-queried during resolution when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileReference {
    /// Creates a reference with no picker-supplied metadata.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            display_name: None,
            mime_type: None,
        }
    }

    /// Attaches a picker-supplied display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Attaches a picker-supplied MIME type.
    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }
}
