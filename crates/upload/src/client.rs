//! Upload client for the file-hosting endpoint.
//!
//! One POST per call: a multipart/form-data body with the fixed
//! `reqtype=fileupload` marker and the file part. The endpoint replies
//! `200 OK` with the hosted URL as raw body text; anything else is a
//! failure. There is no retry; the caller re-invokes for a new attempt.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use airlift_content::{FilePayload, OCTET_STREAM, PayloadData};

/// Default upload endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://catbox.moe/user/api.php";

/// Form field carrying the request-type marker.
const FIELD_REQUEST_TYPE: &str = "reqtype";
/// Request-type marker for file uploads.
const REQUEST_TYPE_FILE_UPLOAD: &str = "fileupload";
/// Form field carrying the file part.
const FIELD_FILE: &str = "fileToUpload";

/// Time allowed to establish the connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed for the whole request.
///
/// The endpoint contract bounds connect, write and read at 30 s each;
/// reqwest exposes connect plus whole-request deadlines, so the request
/// cap covers the write+read worst case.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Errors from the upload client.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("request timed out")]
    Timeout,

    #[error("upload failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Machine-readable failure reason for the bridge error contract.
    pub fn reason(&self) -> &'static str {
        match self {
            UploadError::Timeout => "timeout",
            UploadError::Status { .. } => "http-status",
            UploadError::Http(e) if e.is_connect() => "connect",
            UploadError::Http(_) => "http",
            UploadError::Io(_) => "io",
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    /// Hosted URL returned by the endpoint.
    pub url: String,
    pub file_name: String,
}

/// Configuration for [`UploadClient`].
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Multipart upload client with bounded timeouts.
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    /// Creates a client from the given configuration.
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(UploadError::Http)?;

        Ok(Self {
            http,
            endpoint: config.endpoint,
        })
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Uploads a payload in a single attempt.
    ///
    /// On success the response body text (trailing newline trimmed) is
    /// the hosted URL.
    pub async fn upload(&self, payload: &FilePayload) -> Result<UploadResult, UploadError> {
        let part = self.file_part(payload).await?;
        let form = Form::new()
            .text(FIELD_REQUEST_TYPE, REQUEST_TYPE_FILE_UPLOAD)
            .part(FIELD_FILE, part);

        tracing::debug!(
            file = %payload.file_name(),
            bytes = payload.len(),
            endpoint = %self.endpoint,
            "uploading"
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(map_transport_error)?;
        let url = body.trim_end().to_string();
        tracing::info!(file = %payload.file_name(), url = %url, "upload complete");

        Ok(UploadResult {
            url,
            file_name: payload.file_name().to_string(),
        })
    }

    /// Builds the file part, streaming spilled payloads from disk.
    async fn file_part(&self, payload: &FilePayload) -> Result<Part, UploadError> {
        let part = match payload.data() {
            PayloadData::Memory(bytes) => Part::bytes(bytes.clone()),
            PayloadData::Spilled(path) => {
                let file = tokio::fs::File::open(path).await?;
                Part::stream_with_length(
                    reqwest::Body::wrap_stream(ReaderStream::new(file)),
                    payload.len(),
                )
            }
        };

        part.file_name(payload.file_name().to_string())
            .mime_str(OCTET_STREAM)
            .map_err(UploadError::Http)
    }
}

fn map_transport_error(e: reqwest::Error) -> UploadError {
    if e.is_timeout() {
        UploadError::Timeout
    } else {
        UploadError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airlift_content::ReaderOptions;
    use airlift_content::reader::from_bytes;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Returns `true` once `req` holds the full HTTP request.
    fn request_complete(req: &[u8]) -> bool {
        let Some(header_end) = req.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&req[..header_end]);
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (key, value) = line.split_once(':')?;
                if key.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        req.len() >= header_end + 4 + content_length
    }

    /// Mock HTTP server that captures the request and replies with the
    /// given status and body. The join handle yields the raw request.
    async fn capture_server(status: u16, body: &str) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut req = Vec::new();
            let mut buf = [0u8; 8192];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
                if request_complete(&req) {
                    break;
                }
            }

            let resp = format!(
                "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(resp.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            req
        });

        (url, handle)
    }

    /// Mock server that accepts a connection and never responds.
    async fn stalling_server() -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf).await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        (url, handle)
    }

    fn client_for(url: &str) -> UploadClient {
        UploadClient::new(UploadConfig {
            endpoint: url.to_string(),
            ..UploadConfig::default()
        })
        .unwrap()
    }

    fn memory_payload(data: &[u8], name: &str) -> FilePayload {
        from_bytes(data.to_vec(), name, &ReaderOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn upload_sends_expected_multipart_body() {
        let (url, handle) = capture_server(200, "https://files.example/abc123.png").await;
        let client = client_for(&url);

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let payload = memory_payload(&png, "test.png");
        let result = client.upload(&payload).await.unwrap();

        assert_eq!(result.url, "https://files.example/abc123.png");
        assert_eq!(result.file_name, "test.png");

        let req = handle.await.unwrap();
        let text = String::from_utf8_lossy(&req);
        assert!(text.contains("name=\"reqtype\""));
        assert!(text.contains("fileupload"));
        assert!(text.contains("name=\"fileToUpload\""));
        assert!(text.contains("filename=\"test.png\""));
        assert!(text.contains("Content-Type: application/octet-stream"));
        assert!(
            req.windows(png.len()).any(|w| w == png),
            "request body must carry the raw file bytes"
        );
    }

    #[tokio::test]
    async fn upload_streams_spilled_payload() {
        let (url, handle) = capture_server(200, "https://files.example/big.bin").await;
        let client = client_for(&url);

        let tmp = tempfile::tempdir().unwrap();
        let opts = ReaderOptions {
            spill_threshold: 16,
            temp_dir: tmp.path().to_path_buf(),
        };
        let data = vec![0x42u8; 1024];
        let payload = from_bytes(data.clone(), "big.bin", &opts).unwrap();
        assert!(payload.temp_path().is_some());

        let result = client.upload(&payload).await.unwrap();
        assert_eq!(result.url, "https://files.example/big.bin");

        let req = handle.await.unwrap();
        assert!(req.windows(data.len()).any(|w| w == data));
    }

    #[tokio::test]
    async fn upload_trims_trailing_newline() {
        let (url, handle) = capture_server(200, "https://files.example/x\n").await;
        let client = client_for(&url);

        let payload = memory_payload(b"x", "x.bin");
        let result = client.upload(&payload).await.unwrap();
        assert_eq!(result.url, "https://files.example/x");

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, handle) = capture_server(412, "file too large").await;
        let client = client_for(&url);

        let payload = memory_payload(b"x", "x.bin");
        let err = client.upload(&payload).await.unwrap_err();

        assert_eq!(err.reason(), "http-status");
        match err {
            UploadError::Status { status, body } => {
                assert_eq!(status, 412);
                assert_eq!(body, "file too large");
            }
            other => panic!("expected status error, got {other:?}"),
        }

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn unresponsive_endpoint_times_out() {
        let (url, handle) = stalling_server().await;
        let client = UploadClient::new(UploadConfig {
            endpoint: url,
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_millis(200),
        })
        .unwrap();

        let payload = memory_payload(b"x", "x.bin");
        let err = client.upload(&payload).await.unwrap_err();
        assert_eq!(err.reason(), "timeout");
        assert!(matches!(err, UploadError::Timeout));

        handle.abort();
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        // Bind and drop a listener to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
        drop(listener);

        let client = client_for(&url);
        let payload = memory_payload(b"x", "x.bin");
        let err = client.upload(&payload).await.unwrap_err();
        assert!(matches!(err, UploadError::Http(_) | UploadError::Timeout));
    }
}
