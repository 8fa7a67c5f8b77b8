//! Drains a content stream into an upload-ready payload.
//!
//! Small files stay in memory; anything above the spill threshold goes to
//! a uniquely-named temp file so a picked video cannot exhaust memory.
//! The payload owns its temp file and removes it on drop, which is what
//! guarantees cleanup on every success and failure path.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use airlift_protocol::messages::EncodedFile;
use airlift_protocol::types::FileReference;

use crate::{ContentError, ContentSource, OCTET_STREAM};

/// In-memory size above which payloads spill to a temp file (8 MiB).
pub const DEFAULT_SPILL_THRESHOLD: u64 = 8 * 1024 * 1024;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Options controlling payload acquisition.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Byte count above which the payload spills to disk.
    pub spill_threshold: u64,
    /// Directory for spilled payloads.
    pub temp_dir: PathBuf,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            spill_threshold: DEFAULT_SPILL_THRESHOLD,
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// Where the payload bytes live.
#[derive(Debug)]
pub enum PayloadData {
    Memory(Vec<u8>),
    Spilled(PathBuf),
}

/// Resolved file bytes plus display name and content type.
///
/// If the bytes were spilled to disk, the payload owns that file and
/// deletes it when dropped.
#[derive(Debug)]
pub struct FilePayload {
    file_name: String,
    content_type: String,
    len: u64,
    data: PayloadData,
}

impl FilePayload {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Total payload size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn data(&self) -> &PayloadData {
        &self.data
    }

    /// Path of the spilled temp file, if the payload went to disk.
    pub fn temp_path(&self) -> Option<&Path> {
        match &self.data {
            PayloadData::Spilled(path) => Some(path),
            PayloadData::Memory(_) => None,
        }
    }
}

impl Drop for FilePayload {
    fn drop(&mut self) {
        if let PayloadData::Spilled(path) = &self.data {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(
                    "failed to remove spilled payload {}: {e}",
                    path.display()
                );
            }
        }
    }
}

/// Resolves a content reference into a [`FilePayload`].
///
/// Display name policy, in order: picker-supplied name, source metadata
/// query, last path segment of the URI. If all three come up empty the
/// resolution fails with [`ContentError::NoName`]. MIME resolution never
/// fails; it bottoms out at `application/octet-stream`.
pub fn resolve(
    source: &dyn ContentSource,
    reference: &FileReference,
    opts: &ReaderOptions,
) -> Result<FilePayload, ContentError> {
    let file_name = resolve_file_name(source, reference).ok_or(ContentError::NoName)?;
    let content_type = resolve_mime(source, reference, &file_name);
    let stream = source.open(&reference.uri)?;
    let (data, len) = drain(stream, &file_name, opts)?;

    if let PayloadData::Spilled(path) = &data {
        tracing::debug!(
            file = %file_name,
            bytes = len,
            "payload spilled to {}",
            path.display()
        );
    }

    Ok(FilePayload {
        file_name,
        content_type,
        len,
        data,
    })
}

/// Builds a [`FilePayload`] from pre-decoded bytes.
///
/// Takes the same spill and cleanup path as [`resolve`], so host-supplied
/// data gets identical temp-file semantics.
pub fn from_bytes(
    data: Vec<u8>,
    file_name: &str,
    opts: &ReaderOptions,
) -> Result<FilePayload, ContentError> {
    if file_name.is_empty() {
        return Err(ContentError::NoName);
    }

    let len = data.len() as u64;
    let content_type = mime_for_file_name(file_name)
        .unwrap_or(OCTET_STREAM)
        .to_string();

    let data = if len > opts.spill_threshold {
        let (path, file) = begin_spill(&data, file_name, opts)?;
        drop(file);
        PayloadData::Spilled(path)
    } else {
        PayloadData::Memory(data)
    };

    Ok(FilePayload {
        file_name: file_name.to_string(),
        content_type,
        len,
        data,
    })
}

/// Read-only variant: resolves a reference and returns the bytes encoded
/// for transport back to the host, without uploading anything.
pub fn read_and_encode(
    source: &dyn ContentSource,
    reference: &FileReference,
) -> Result<EncodedFile, ContentError> {
    let file_name = resolve_file_name(source, reference).ok_or(ContentError::NoName)?;
    let mime_type = resolve_mime(source, reference, &file_name);
    let mut stream = source.open(&reference.uri)?;

    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;
    tracing::debug!(file = %file_name, bytes = data.len(), "content read for host-side handling");

    Ok(EncodedFile {
        data,
        file_name,
        mime_type,
    })
}

/// Resolves the display name for a reference. `None` means unresolvable.
fn resolve_file_name(source: &dyn ContentSource, reference: &FileReference) -> Option<String> {
    reference
        .display_name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| source.display_name(&reference.uri).filter(|n| !n.is_empty()))
        .or_else(|| derive_file_name(&reference.uri))
}

/// Derives a file name from the last path segment of a URI.
fn derive_file_name(uri: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let segment = path.rsplit('/').next().unwrap_or(path);
    // A bare scheme ("content://") or trailing slash yields no segment.
    if segment.is_empty() || segment.contains(':') {
        return None;
    }
    Some(segment.to_string())
}

/// Resolves a content type. Never fails; falls back to octet-stream.
fn resolve_mime(source: &dyn ContentSource, reference: &FileReference, file_name: &str) -> String {
    reference
        .mime_type
        .clone()
        .filter(|m| !m.is_empty())
        .or_else(|| source.mime_type(&reference.uri).filter(|m| !m.is_empty()))
        .or_else(|| mime_for_file_name(file_name).map(str::to_string))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// Maps the media extensions the pickers filter on to MIME types.
fn mime_for_file_name(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit('.').next()?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// Drains `stream` into memory, spilling to a temp file once `opts`'s
/// threshold is exceeded. Returns the data location and total length.
fn drain(
    mut stream: Box<dyn Read + Send>,
    file_name: &str,
    opts: &ReaderOptions,
) -> Result<(PayloadData, u64), ContentError> {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut spill: Option<(PathBuf, File)> = None;
    let mut total: u64 = 0;

    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                discard_spill(spill.take());
                return Err(ContentError::Io(e));
            }
        };
        total += n as u64;

        if let Some((_, file)) = spill.as_mut() {
            if let Err(e) = file.write_all(&chunk[..n]) {
                discard_spill(spill.take());
                return Err(ContentError::Io(e));
            }
        } else {
            buf.extend_from_slice(&chunk[..n]);
            if total > opts.spill_threshold {
                spill = Some(begin_spill(&buf, file_name, opts)?);
                buf = Vec::new();
            }
        }
    }

    match spill {
        Some((path, mut file)) => {
            if let Err(e) = file.flush() {
                discard_spill(Some((path, file)));
                return Err(ContentError::Io(e));
            }
            drop(file);
            Ok((PayloadData::Spilled(path), total))
        }
        None => Ok((PayloadData::Memory(buf), total)),
    }
}

/// Creates the spill file and writes the already-buffered bytes into it.
///
/// The name carries a v4 UUID so concurrent transfers of equally-named
/// files cannot collide in the temp namespace.
fn begin_spill(
    buffered: &[u8],
    file_name: &str,
    opts: &ReaderOptions,
) -> Result<(PathBuf, File), ContentError> {
    let path = opts.temp_dir.join(format!(
        "{}-{}",
        uuid::Uuid::new_v4(),
        sanitize_file_name(file_name)
    ));
    let mut file = File::create(&path)?;
    if let Err(e) = file.write_all(buffered) {
        discard_spill(Some((path, file)));
        return Err(ContentError::Io(e));
    }
    Ok((path, file))
}

fn discard_spill(spill: Option<(PathBuf, File)>) {
    if let Some((path, file)) = spill {
        drop(file);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!("failed to remove partial spill {}: {e}", path.display());
        }
    }
}

/// Strips path separators so a display name cannot escape the temp dir.
fn sanitize_file_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
