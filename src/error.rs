//! Error types for the pdfmd library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfMdError`] — **Fatal**: the run cannot proceed at all (missing
//!   input file, corrupt PDF, missing image directory). Returned as
//!   `Err(PdfMdError)` from the top-level entry points, and always before
//!   any mutation of the target files.
//!
//! * [`ImageError`] / [`FileOpError`] — **Non-fatal**: one embedded image
//!   could not be decoded or saved, or one file copy/delete failed during
//!   reconciliation. These are recorded in [`crate::output::ConversionStats`]
//!   and [`crate::output::ReconcileReport`] and logged at WARN, so callers
//!   can inspect partial success rather than losing the whole run to one
//!   bad file.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first skipped image, log and continue, or collect everything for a
//! post-run report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfmd library.
///
/// Per-image and per-file failures use [`ImageError`] and [`FileOpError`]
/// and are stored in the run reports rather than propagated here.
#[derive(Debug, Error)]
pub enum PdfMdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Image directory was not found at the given path.
    #[error("Image directory not found: '{path}'\nRun the converter first, or check the document identifier.")]
    DirectoryNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Element errors ────────────────────────────────────────────────────
    /// The element JSON from the layout-extraction service could not be parsed.
    #[error("Failed to parse element JSON '{path}': {detail}")]
    MalformedElements { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file or directory.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Resolution order: ConversionConfig::pdfium_lib_path, then the\n\
PDFIUM_LIB_PATH environment variable, then the system library search.\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure for a single embedded image during extraction.
///
/// Stored in [`crate::output::ConversionStats::skipped_images`]; the
/// extraction continues with the remaining images and pages.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// The embedded image could not be decoded from the page object.
    #[error("Page {page} image {index}: decode failed: {detail}")]
    DecodeFailed {
        page: usize,
        index: usize,
        detail: String,
    },

    /// The decoded image could not be written as PNG.
    #[error("Page {page} image {index}: save to '{path}' failed: {detail}")]
    SaveFailed {
        page: usize,
        index: usize,
        path: PathBuf,
        detail: String,
    },
}

/// A non-fatal failure for a single file during reconciliation.
///
/// Stored in [`crate::output::ReconcileReport::failures`]; the run continues
/// with the remaining files. A failed copy also suppresses the delete of
/// that file's original, so nothing is lost.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileOpError {
    /// Copying the original to its prefixed name failed.
    #[error("Copy '{name}' -> '{new_name}' failed: {detail}")]
    CopyFailed {
        name: String,
        new_name: String,
        detail: String,
    },

    /// Deleting an orphaned or superseded original failed.
    #[error("Delete '{name}' failed: {detail}")]
    DeleteFailed { name: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = PdfMdError::FileNotFound {
            path: PathBuf::from("missing.md"),
        };
        assert!(e.to_string().contains("missing.md"));
    }

    #[test]
    fn directory_not_found_display() {
        let e = PdfMdError::DirectoryNotFound {
            path: PathBuf::from("1"),
        };
        assert!(e.to_string().contains("Image directory not found"));
    }

    #[test]
    fn image_error_display() {
        let e = ImageError::DecodeFailed {
            page: 3,
            index: 2,
            detail: "unsupported filter".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 3"), "got: {msg}");
        assert!(msg.contains("image 2"), "got: {msg}");
    }

    #[test]
    fn file_op_error_display() {
        let e = FileOpError::CopyFailed {
            name: "page1_img1.png".into(),
            new_name: "doc_page1_img1.png".into(),
            detail: "disk full".into(),
        };
        assert!(e.to_string().contains("doc_page1_img1.png"));
    }
}
