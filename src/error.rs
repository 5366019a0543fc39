// src/error.rs

//! Error types for the recipe runner
//!
//! Every failure here is fatal: nothing is caught, retried, or translated.
//! Build-tool output is carried through verbatim so the invoking tool sees
//! exactly what the wrapped build system reported.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while executing a recipe
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Download completed but the server returned a failure status
    #[error("download failed: {0}")]
    Download(String),

    /// Archive digest did not match the recipe's pinned checksum
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// A build phase (configure, build, install) exited non-zero
    ///
    /// `detail` carries the wrapped tool's stderr verbatim.
    #[error("{phase} failed: {detail}")]
    Build { phase: &'static str, detail: String },

    /// Recipe file or checksum string could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Expected file or directory missing
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Unsupported value (archive format, OS name, build type)
    #[error("unsupported: {0}")]
    Unsupported(String),
}
