//! Multipart upload client and transfer orchestration.
//!
//! [`UploadClient`] posts one file per call to the hosting endpoint as
//! multipart/form-data; [`Transfer`] sequences payload acquisition and
//! upload on a background task and delivers exactly one terminal
//! outcome through the caller's callbacks.

pub mod client;
pub mod transfer;

pub use client::{DEFAULT_ENDPOINT, UploadClient, UploadConfig, UploadError, UploadResult};
pub use transfer::{
    Transfer, TransferCallbacks, TransferError, TransferHandle, TransferInput, TransferPhase,
};
