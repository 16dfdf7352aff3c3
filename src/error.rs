//! Error types for the zpl2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ZplError`] — **Fatal**: the job cannot produce an artifact (no upload,
//!   malformed archive, a payload that is not a PDF reached the assembler,
//!   compression failed). Returned as `Err(ZplError)` from the `convert_*`
//!   entry points and surfaced to the HTTP caller as a 400.
//!
//! * [`LabelError`] — **Non-fatal**: the rendering service refused or failed a
//!   single label. It never leaves the batch converter as an `Err`; its
//!   `Display` text is embedded in the placeholder payload that takes the
//!   label's slot in the output sequence.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the zpl2pdf library.
#[derive(Debug, Error)]
pub enum ZplError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The upload did not carry a `file` field.
    #[error("No file uploaded.")]
    NoFileUploaded,

    /// The multipart body could not be read.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// The uploaded bytes are not a readable ZIP archive.
    #[error("Invalid archive: {detail}")]
    InvalidArchive { detail: String },

    /// Could not read a local input archive.
    #[error("Failed to read input archive '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Assembly / packaging errors ───────────────────────────────────────
    /// A conversion payload could not be parsed as a PDF.
    ///
    /// `index` is zero-based; the message counts labels from 1 to match
    /// `output_name`.
    ///
    /// Under [`crate::config::AssemblyPolicy::Strict`] a single failed label
    /// (whose payload is a text diagnostic) ends up here and fails the job.
    #[error("Failed to merge '{}' (label #{}): {}", .output_name, .index + 1, .detail)]
    AssemblyFailed {
        index: usize,
        output_name: String,
        detail: String,
    },

    /// Serialising the combined PDF or compressing the archive failed.
    #[error("Failed to package result: {0}")]
    PackagingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output archive.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single label render.
///
/// The message format matches what ends up inside the diagnostic placeholder,
/// e.g. `Failed to convert ZPL to PDF: Error details: ERROR: Invalid label`.
#[derive(Debug, Clone, Error)]
pub enum LabelError {
    /// The request never produced a response (DNS, connect, reset, …).
    #[error("Failed to convert ZPL to PDF: {detail}")]
    Transport { detail: String },

    /// The rendering service answered with a non-success status.
    #[error("Failed to convert ZPL to PDF: Error details: {body}")]
    HttpStatus { status: u16, body: String },

    /// The configured client timeout elapsed.
    #[error("Failed to convert ZPL to PDF: request timed out after {secs}s")]
    Timeout { secs: u64 },
}
