//! Method dispatch for the uploader bridge.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};

use airlift_content::{ContentSource, ReaderOptions, reader};
use airlift_protocol::envelope::{Call, CallError, Event, Reply};
use airlift_protocol::messages::{
    EVENT_UPLOAD_STATUS, UploadMediaRequest, UploadResponse, methods,
};
use airlift_upload::{
    Transfer, TransferCallbacks, TransferError, TransferInput, UploadClient,
};

use crate::picker::{DEFAULT_MEDIA_TYPES, MediaPicker, PickError};
use crate::sink::HostSink;

/// The uploader plugin surface.
///
/// Owns its capabilities (content source, picker, upload client) as
/// injected dependencies and routes host calls to the pipeline. One
/// bridge serves any number of concurrent calls; each transfer runs on
/// its own task and replies through the sink it was given.
pub struct UploaderBridge {
    source: Arc<dyn ContentSource>,
    picker: Arc<dyn MediaPicker>,
    transfer: Transfer,
}

impl UploaderBridge {
    pub fn new(
        source: Arc<dyn ContentSource>,
        picker: Arc<dyn MediaPicker>,
        client: UploadClient,
        reader: ReaderOptions,
    ) -> Self {
        let transfer = Transfer::new(Arc::clone(&source), Arc::new(client), reader);
        Self {
            source,
            picker,
            transfer,
        }
    }

    /// Dispatches a host call.
    ///
    /// Returns once the call is either answered or handed to a transfer
    /// task; the terminal reply always arrives through `sink`.
    pub async fn handle(&self, call: Call, sink: Arc<dyn HostSink>) {
        tracing::debug!(method = %call.method, id = %call.id, "bridge call");
        match call.method.as_str() {
            methods::PICK_AND_UPLOAD_MEDIA => self.pick_and_upload(call, sink).await,
            methods::UPLOAD_MEDIA => self.upload_media(call, sink),
            methods::PICK_MEDIA => self.pick_media(call, sink).await,
            other => {
                tracing::warn!("unknown bridge method: {other}");
                sink.send(call.reject(format!("not implemented: {other}")));
            }
        }
    }

    async fn pick_and_upload(&self, call: Call, sink: Arc<dyn HostSink>) {
        match self.picker.pick(default_media_filter()).await {
            Ok(Some(reference)) => {
                self.start_transfer(call.id, TransferInput::Reference(reference), sink);
            }
            Ok(None) => sink.send(call.reject("File selection cancelled")),
            Err(e) => sink.send(Reply::reject_with(call.id.as_str(), picker_error(&e))),
        }
    }

    fn upload_media(&self, call: Call, sink: Arc<dyn HostSink>) {
        let request: UploadMediaRequest = match call.parse_payload() {
            Ok(Some(request)) => request,
            Ok(None) => {
                sink.send(call.reject("Missing required parameters fileData or fileName"));
                return;
            }
            Err(e) => {
                sink.send(call.reject(format!("Invalid payload: {e}")));
                return;
            }
        };

        let (Some(file_data), Some(file_name)) = (request.file_data, request.file_name) else {
            sink.send(call.reject("Missing required parameters fileData or fileName"));
            return;
        };

        // Hosts wrap base64 freely; strip whitespace before decoding.
        let compact: String = file_data.chars().filter(|c| !c.is_whitespace()).collect();
        let data = match STANDARD.decode(compact.as_bytes()) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("rejecting undecodable file data: {e}");
                sink.send(call.reject("Invalid file data"));
                return;
            }
        };

        self.start_transfer(call.id, TransferInput::Bytes { data, file_name }, sink);
    }

    async fn pick_media(&self, call: Call, sink: Arc<dyn HostSink>) {
        let reference = match self.picker.pick(default_media_filter()).await {
            Ok(Some(reference)) => reference,
            Ok(None) => {
                sink.send(call.reject("File selection cancelled"));
                return;
            }
            Err(e) => {
                sink.send(Reply::reject_with(call.id.as_str(), picker_error(&e)));
                return;
            }
        };

        let source = Arc::clone(&self.source);
        let read =
            tokio::task::spawn_blocking(move || reader::read_and_encode(source.as_ref(), &reference))
                .await;

        match read {
            Ok(Ok(encoded)) => match call.resolve(&encoded) {
                Ok(reply) => sink.send(reply),
                Err(e) => sink.send(call.reject(format!("Failed to encode file: {e}"))),
            },
            Ok(Err(e)) => {
                sink.send(Reply::reject_with(
                    call.id.as_str(),
                    CallError {
                        message: format!("Failed to read file: {e}"),
                        cause: std::error::Error::source(&e).map(ToString::to_string),
                        reason: Some(e.reason().to_string()),
                    },
                ));
            }
            Err(e) => sink.send(call.reject(format!("Failed to read file: {e}"))),
        }
    }

    /// Spawns a transfer whose callbacks answer `call_id` through `sink`.
    fn start_transfer(&self, call_id: String, input: TransferInput, sink: Arc<dyn HostSink>) {
        let status_sink = Arc::clone(&sink);
        let ok_sink = Arc::clone(&sink);
        let ok_id = call_id.clone();
        let err_sink = sink;
        let err_id = call_id;

        let callbacks = TransferCallbacks::new(
            move |result| {
                let response = UploadResponse {
                    url: result.url,
                    file_name: result.file_name,
                    status: UploadResponse::STATUS_COMPLETE.to_string(),
                };
                match Reply::resolve(ok_id.as_str(), &response) {
                    Ok(reply) => ok_sink.send(reply),
                    Err(e) => {
                        ok_sink.send(Reply::reject(
                            ok_id.as_str(),
                            format!("Failed to encode response: {e}"),
                        ));
                    }
                }
            },
            move |err| {
                err_sink.send(Reply::reject_with(err_id.as_str(), transfer_error(&err)));
            },
        )
        .with_status(move |status| {
            if let Ok(event) = Event::new(EVENT_UPLOAD_STATUS, Some(&status)) {
                status_sink.emit(event);
            }
        });

        self.transfer.spawn(input, callbacks);
    }
}

fn default_media_filter() -> Vec<String> {
    DEFAULT_MEDIA_TYPES.iter().map(|m| m.to_string()).collect()
}

/// Maps a transfer failure to the host error contract.
///
/// The message identifies the failing phase the way the shipped JS
/// expects; `reason` stays machine-readable.
fn transfer_error(err: &TransferError) -> CallError {
    let (message, cause) = match err {
        TransferError::Read(e) => (
            format!("Failed to read file: {e}"),
            std::error::Error::source(e).map(ToString::to_string),
        ),
        TransferError::Upload(e) => (
            format!("Upload failed: {e}"),
            std::error::Error::source(e).map(ToString::to_string),
        ),
        TransferError::Internal { message, .. } => (format!("Upload failed: {message}"), None),
    };
    CallError {
        message,
        cause,
        reason: Some(err.reason().to_string()),
    }
}

fn picker_error(err: &PickError) -> CallError {
    CallError {
        message: format!("Failed to open picker: {err}"),
        cause: None,
        reason: Some("picker".to_string()),
    }
}
