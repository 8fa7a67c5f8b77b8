//! Wire types for the airlift host-bridge call contract.
//!
//! The hybrid-app shell invokes the native side with a [`Call`] envelope
//! and receives a [`Reply`] (resolve or reject) plus optional named
//! [`Event`]s on an out-of-band channel. Payloads stay as raw JSON until
//! a handler asks for a concrete type.

pub mod envelope;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use envelope::{Call, CallError, Event, Reply};
pub use messages::{EncodedFile, StatusEvent, UploadMediaRequest, UploadResponse};
pub use types::FileReference;
