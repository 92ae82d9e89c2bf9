//! Error types for the scanao library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ScanAoError`] — **Fatal**: the analysis cannot proceed at all
//!   (bad input path, no API key, model dead after retries, nothing
//!   extracted from any dossier file). Returned as `Err(ScanAoError)` from
//!   the top-level `analyze*` functions.
//!
//! * [`DocumentError`] — **Non-fatal**: a single dossier file could not be
//!   read (corrupt PDF, extraction glitch) but the other files are fine.
//!   Stored inside [`crate::output::DocumentResult`] so callers can inspect
//!   partial extraction rather than losing the whole request to one bad file.
//!
//! The analysis itself is all-or-nothing by contract: a dead model or an
//! entirely empty corpus is one opaque failure for the request, never a
//! partial report.

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::llm::LlmError;

/// All fatal errors returned by the scanao library.
///
/// File-level extraction failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ScanAoError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// No input files were given.
    #[error("No input files given — at least one PDF dossier is required")]
    NoInput,

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Every dossier file yielded empty text; there is nothing to analyse.
    #[error("No text could be extracted from any of the {total} input file(s).\nScanned PDFs need OCR before analysis; scanao only reads embedded text.")]
    AllDocumentsEmpty { total: usize },

    // ── Model errors ──────────────────────────────────────────────────────
    /// No API key and no pre-built provider were configured.
    #[error("LLM provider is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    /// The model call failed after all retries.
    #[error("Analysis failed after {retries} attempt(s): {source}")]
    ModelFailed {
        retries: u32,
        #[source]
        source: LlmError,
    },

    /// The model answered with empty content.
    #[error("The model returned an empty report")]
    EmptyReport,

    // ── Report errors ─────────────────────────────────────────────────────
    /// PDF report assembly failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Could not create or write the output PDF file.
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

/// A non-fatal error for a single dossier file.
///
/// Stored alongside [`crate::output::DocumentResult`] when extraction fails.
/// The overall analysis continues unless ALL files come back empty.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The PDF library rejected or choked on the file.
    #[error("'{name}': text extraction failed: {detail}")]
    ExtractionFailed { name: String, detail: String },

    /// The file parsed but contained no extractable text.
    #[error("'{name}': no embedded text (scanned document?)")]
    NoText { name: String },
}

/// Errors raised while assembling the PDF report.
///
/// These are plumbing failures only — malformed report text never errors,
/// it falls back to plain-paragraph rendering line by line.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A page content stream could not be encoded.
    #[error("Failed to encode page {page} content stream: {detail}")]
    Content { page: usize, detail: String },

    /// Serialising the finished document failed.
    #[error("Failed to serialise PDF document: {0}")]
    Write(String),
}
