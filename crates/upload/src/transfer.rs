//! Transfer orchestration: read phase, upload phase, terminal callback.
//!
//! Each invocation runs on its own tokio task so the caller is never
//! blocked. The state machine is `Idle -> Reading -> Uploading ->
//! Done | Failed`; terminal states are final and exactly one terminal
//! callback fires per transfer (enforced by `FnOnce`). A payload that
//! spilled to disk is disposed when the upload phase is left, on both
//! outcomes.

use std::fmt;
use std::sync::Arc;

use airlift_content::reader;
use airlift_content::{ContentError, ContentSource, ReaderOptions};
use airlift_protocol::messages::StatusEvent;
use airlift_protocol::types::FileReference;

use crate::client::{UploadClient, UploadError, UploadResult};

/// Phases of a transfer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Idle,
    Reading,
    Uploading,
    Done,
    Failed,
}

impl TransferPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TransferPhase::Idle => "idle",
            TransferPhase::Reading => "reading",
            TransferPhase::Uploading => "uploading",
            TransferPhase::Done => "done",
            TransferPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal error of a transfer, tagged with its originating phase.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("read phase failed: {0}")]
    Read(#[from] ContentError),

    #[error("upload phase failed: {0}")]
    Upload(#[from] UploadError),

    #[error("{phase} phase aborted: {message}")]
    Internal {
        phase: TransferPhase,
        message: String,
    },
}

impl TransferError {
    /// The phase the failure originated from.
    pub fn phase(&self) -> TransferPhase {
        match self {
            TransferError::Read(_) => TransferPhase::Reading,
            TransferError::Upload(_) => TransferPhase::Uploading,
            TransferError::Internal { phase, .. } => *phase,
        }
    }

    /// Machine-readable failure reason for the bridge error contract.
    pub fn reason(&self) -> &'static str {
        match self {
            TransferError::Read(e) => e.reason(),
            TransferError::Upload(e) => e.reason(),
            TransferError::Internal { .. } => "internal",
        }
    }
}

/// Input to a transfer: either a picker reference or pre-decoded bytes.
///
/// Both shapes run the same state machine; raw bytes still get the
/// payload spill and cleanup semantics.
#[derive(Debug)]
pub enum TransferInput {
    Reference(FileReference),
    Bytes { data: Vec<u8>, file_name: String },
}

impl TransferInput {
    fn label(&self) -> &str {
        match self {
            TransferInput::Reference(reference) => &reference.uri,
            TransferInput::Bytes { file_name, .. } => file_name,
        }
    }
}

/// Advisory status callback, invoked zero or more times.
pub type StatusCallback = Box<dyn Fn(StatusEvent) + Send + Sync>;
/// Terminal success callback, invoked at most once.
pub type SuccessCallback = Box<dyn FnOnce(UploadResult) + Send>;
/// Terminal error callback, invoked at most once.
pub type ErrorCallback = Box<dyn FnOnce(TransferError) + Send>;

/// Callback contract for one transfer invocation.
pub struct TransferCallbacks {
    on_status: Option<StatusCallback>,
    on_success: SuccessCallback,
    on_error: ErrorCallback,
}

impl TransferCallbacks {
    /// Creates the contract from its two mandatory terminal callbacks.
    pub fn new(
        on_success: impl FnOnce(UploadResult) + Send + 'static,
        on_error: impl FnOnce(TransferError) + Send + 'static,
    ) -> Self {
        Self {
            on_status: None,
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
        }
    }

    /// Registers the advisory status callback.
    pub fn with_status(mut self, on_status: impl Fn(StatusEvent) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Box::new(on_status));
        self
    }
}

/// Handle to a spawned transfer task.
pub struct TransferHandle {
    task: tokio::task::JoinHandle<TransferPhase>,
}

impl TransferHandle {
    /// Waits for the transfer to finish and returns its terminal phase.
    pub async fn join(self) -> TransferPhase {
        self.task.await.unwrap_or(TransferPhase::Failed)
    }
}

/// Orchestrates transfers: one background task per invocation.
pub struct Transfer {
    source: Arc<dyn ContentSource>,
    client: Arc<UploadClient>,
    reader: ReaderOptions,
}

impl Transfer {
    pub fn new(
        source: Arc<dyn ContentSource>,
        client: Arc<UploadClient>,
        reader: ReaderOptions,
    ) -> Self {
        Self {
            source,
            client,
            reader,
        }
    }

    /// Starts a transfer on a new task and returns immediately.
    ///
    /// The terminal outcome arrives through `callbacks`; the handle only
    /// exposes task completion.
    pub fn spawn(&self, input: TransferInput, callbacks: TransferCallbacks) -> TransferHandle {
        let source = Arc::clone(&self.source);
        let client = Arc::clone(&self.client);
        let reader = self.reader.clone();

        let task = tokio::spawn(run(source, client, reader, input, callbacks));
        TransferHandle { task }
    }
}

async fn run(
    source: Arc<dyn ContentSource>,
    client: Arc<UploadClient>,
    reader_opts: ReaderOptions,
    input: TransferInput,
    callbacks: TransferCallbacks,
) -> TransferPhase {
    let TransferCallbacks {
        on_status,
        on_success,
        on_error,
    } = callbacks;

    let label = input.label().to_string();
    tracing::debug!(input = %label, "transfer started");

    // Reading: stream drains are blocking I/O, keep them off the runtime.
    let acquired = tokio::task::spawn_blocking(move || match input {
        TransferInput::Reference(reference) => {
            reader::resolve(source.as_ref(), &reference, &reader_opts)
        }
        TransferInput::Bytes { data, file_name } => {
            reader::from_bytes(data, &file_name, &reader_opts)
        }
    })
    .await;

    let payload = match acquired {
        Ok(Ok(payload)) => payload,
        Ok(Err(e)) => {
            let err = TransferError::Read(e);
            tracing::warn!("transfer of {label} failed: {err}");
            on_error(err);
            return TransferPhase::Failed;
        }
        Err(e) => {
            let err = TransferError::Internal {
                phase: TransferPhase::Reading,
                message: e.to_string(),
            };
            tracing::error!("transfer of {label} failed: {err}");
            on_error(err);
            return TransferPhase::Failed;
        }
    };

    // Uploading.
    if let Some(on_status) = &on_status {
        on_status(StatusEvent::uploading());
    }

    let result = client.upload(&payload).await;
    // Leaving the upload phase disposes the payload (and its temp file)
    // on both outcomes.
    drop(payload);

    match result {
        Ok(result) => {
            on_success(result);
            TransferPhase::Done
        }
        Err(e) => {
            let err = TransferError::Upload(e);
            tracing::warn!("transfer of {label} failed: {err}");
            on_error(err);
            TransferPhase::Failed
        }
    }
}
