//! Host-facing plugin surface for the airlift uploader.
//!
//! The hybrid-app shell hands a [`Call`](airlift_protocol::Call) to
//! [`UploaderBridge::handle`] and receives the terminal reply plus any
//! named events through a [`HostSink`]. Shell adapters (Capacitor,
//! Tauri, Electron IPC, ...) only translate between their runtime's
//! invoke mechanism and these two seams.

mod handler;
mod picker;
mod sink;

pub use handler::UploaderBridge;
pub use picker::{DEFAULT_MEDIA_TYPES, MediaPicker, PickError, PickFuture};
pub use sink::HostSink;
