//! # pdfmd
//!
//! Convert OCR-classified PDF documents to Markdown, with embedded-image
//! extraction and reference reconciliation.
//!
//! ## Why this crate?
//!
//! Layout-extraction services partition a PDF into classified elements
//! (titles, lists, tables, image placeholders) but leave two gaps: the
//! embedded raster images still live inside the PDF, and once extracted
//! their file names are opaque and accumulate orphans across runs. This
//! crate fills both gaps — it wires Image elements to the actual extracted
//! files during Markdown emission, and it reconciles the finished document
//! against its image directory (prefix-rename the referenced files, rewrite
//! the links, delete everything unreferenced).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF + elements.json
//!  │
//!  ├─ 1. Extract    embedded raster images via pdfium → page<N>_img<M>.png
//!  ├─ 2. Emit       classified elements → Markdown blocks, images wired in
//!  ├─ 3. Cleanup    deterministic text normalisation
//!  └─ 4. Output     <id>.md + <id>/ image directory
//!
//! <id>.md + <id>/
//!  │
//!  └─ Reconcile     scan refs → prefix-rename → rewrite links → prune
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfmd::{convert_to_file, load_elements, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let elements = load_elements("document.json".as_ref())?;
//!     let config = ConversionConfig::default();
//!     let output = convert_to_file("document.pdf", &elements, "document", &config)?;
//!     eprintln!(
//!         "{} images extracted, {} referenced",
//!         output.stats.images_extracted, output.stats.images_referenced
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfmd` and `pdfmd-rename` binaries (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfmd = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod element;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod reconcile;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{bind_pdfium, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_to_file};
pub use element::{elements_from_json, load_elements, DocumentElement, ElementCategory};
pub use error::{FileOpError, ImageError, PdfMdError};
pub use output::{ConversionOutput, ConversionStats, ImagePathMap, ReconcileReport};
pub use reconcile::{plan_renames, reconcile, rewrite_references, scan_references, ImageReference};
