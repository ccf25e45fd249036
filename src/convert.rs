//! Eager (full-document) conversion entry points.
//!
//! The conversion is a sequential batch: extract the embedded images, emit
//! the Markdown from the classified elements, clean the text, and — for
//! [`convert_to_file`] — write the document out. There are no suspension
//! points beyond ordinary blocking I/O; the run is self-contained over one
//! PDF, one element sequence, and one output directory.

use crate::config::ConversionConfig;
use crate::element::DocumentElement;
use crate::error::PdfMdError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::{cleanup, emit, extract};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Convert a PDF plus its classified elements to Markdown.
///
/// This is the primary entry point for the library. Extracted images are
/// written under `<output_root>/<doc_id>/`; the assembled Markdown is
/// returned in memory (use [`convert_to_file`] to also write `<doc_id>.md`).
///
/// # Errors
/// Returns `Err(PdfMdError)` only for fatal errors (missing or non-PDF
/// input, corrupt document, pdfium binding failure, unwritable output
/// directory). Per-image decode/save failures are recorded in
/// `output.stats.skipped_images` and logged, and do not abort the run.
pub fn convert(
    pdf_path: impl AsRef<Path>,
    elements: &[DocumentElement],
    doc_id: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfMdError> {
    let total_start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    info!("Starting conversion: {} (id: {doc_id})", pdf_path.display());

    // ── Step 1: Extract embedded images ──────────────────────────────────
    let image_dir = config.image_dir(doc_id);
    let (image_map, skipped_images) = extract::extract_images(pdf_path, &image_dir, config)?;
    let total_pages = image_map.len();
    let images_extracted: usize = image_map.values().map(Vec::len).sum();

    // ── Step 2: Emit Markdown from the element sequence ──────────────────
    let emitted = emit::render_elements(elements, &image_map, doc_id);

    // ── Step 3: Clean the assembled text ─────────────────────────────────
    let markdown = cleanup::clean_markdown(&emitted.to_markdown());

    let stats = ConversionStats {
        total_pages,
        images_extracted,
        skipped_images,
        elements: elements.len(),
        images_referenced: emitted.images_referenced,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} elements, {} images referenced, {}ms",
        stats.elements, stats.images_referenced, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        markdown,
        image_map,
        stats,
    })
}

/// Convert and write the Markdown to `<output_root>/<doc_id>.md`.
///
/// The file is written via temp-file persist in the target directory, so a
/// failure never leaves a partially written document.
pub fn convert_to_file(
    pdf_path: impl AsRef<Path>,
    elements: &[DocumentElement],
    doc_id: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfMdError> {
    let output = convert(pdf_path, elements, doc_id, config)?;

    let md_path = config.markdown_path(doc_id);
    if let Some(parent) = md_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PdfMdError::OutputWriteFailed {
            path: md_path.clone(),
            source: e,
        })?;
    }

    let dir = md_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| PdfMdError::OutputWriteFailed {
            path: md_path.clone(),
            source: e,
        })?;
    tmp.write_all(output.markdown.as_bytes())
        .map_err(|e| PdfMdError::OutputWriteFailed {
            path: md_path.clone(),
            source: e,
        })?;
    tmp.persist(&md_path)
        .map_err(|e| PdfMdError::OutputWriteFailed {
            path: md_path.clone(),
            source: e.error,
        })?;

    info!("Wrote {}", md_path.display());
    Ok(output)
}
