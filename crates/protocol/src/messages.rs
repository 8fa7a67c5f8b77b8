use serde::{Deserialize, Serialize};

/// Method names the host invokes on the uploader bridge.
pub mod methods {
    /// Pick a media file interactively, then upload it.
    pub const PICK_AND_UPLOAD_MEDIA: &str = "pickAndUploadMedia";
    /// Upload pre-decoded file data supplied by the host.
    pub const UPLOAD_MEDIA: &str = "uploadMedia";
    /// Pick a media file and return its bytes without uploading.
    pub const PICK_MEDIA: &str = "pickMedia";
}

/// Event channel for advisory transfer status notifications.
pub const EVENT_UPLOAD_STATUS: &str = "uploadStatus";

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Payload of an `uploadMedia` call.
///
/// `file_data` is base64 text as sent by the JS side; both fields are
/// optional on the wire so the bridge can report which one is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMediaRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Resolve payload of a completed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Hosted URL returned by the endpoint.
    pub url: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

impl UploadResponse {
    /// Status text delivered with a successful upload.
    pub const STATUS_COMPLETE: &'static str = "Upload complete!";
}

/// Resolve payload of a `pickMedia` call.
///
/// The `data` field is base64-encoded in JSON to match the host's
/// transport expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedFile {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Advisory status notification emitted on [`EVENT_UPLOAD_STATUS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: String,
}

impl StatusEvent {
    /// Status emitted when a transfer enters its upload phase.
    pub fn uploading() -> Self {
        Self {
            status: "Uploading to catbox.moe...".into(),
        }
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
