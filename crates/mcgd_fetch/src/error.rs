//! Error types for fetching and verifying blobs.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. Transport, filesystem and JSON errors convert via `From`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching blobs or resolving versions.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (hashing, deleting or writing a blob).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON (descriptors, asset index, catalog).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP transport failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Request for {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// A freshly downloaded blob does not hash to the expected value.
    #[error("Integrity check failed for {url}: expected {expected}, got {actual}")]
    Integrity {
        url: String,
        expected: String,
        actual: String,
        path: Utf8PathBuf,
    },

    /// A version id or alias does not exist in the catalog.
    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    /// A descriptor or index has an unexpected shape.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
}
