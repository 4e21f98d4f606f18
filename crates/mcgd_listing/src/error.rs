//! Error types for listing generation.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. External error types (`std::io::Error`, `serde_json::Error`,
//! zip errors) are automatically converted via `From` impls.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a report tree into listings.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading reports, writing listings, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A report or data file is not valid JSON.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing a listing failed.
    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The client archive could not be read.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A structure file is not valid NBT.
    #[error("NBT error in {path}: {source}")]
    Nbt {
        path: Utf8PathBuf,
        #[source]
        source: quartz_nbt::io::NbtIoError,
    },

    /// Walking a directory tree failed.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A required category could not be located in any known layout.
    #[error("Missing {category}: none of [{}] exists under {root}", candidates.join(", "))]
    Resolution {
        category: String,
        root: Utf8PathBuf,
        candidates: Vec<String>,
    },

    /// A node has a shape this tool does not know how to read.
    ///
    /// Raised for unknown modifier, condition, component, key or node types.
    #[error("Unknown {kind} in {category} '{file}': {detail}")]
    Schema {
        category: &'static str,
        file: String,
        kind: &'static str,
        detail: String,
    },
}

impl Error {
    pub fn schema(
        category: &'static str,
        file: impl Into<String>,
        kind: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self::Schema {
            category,
            file: file.into(),
            kind,
            detail: detail.into(),
        }
    }
}
