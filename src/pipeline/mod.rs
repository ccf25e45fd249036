//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. switch the PDF backend) without touching the
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ emit ──▶ cleanup
//! (pdfium)   (elements  (text
//!             + map)     rules)
//! ```
//!
//! 1. [`extract`] — walk every page's embedded raster images via pdfium and
//!    write them out as `page<N>_img<M>.png`, building the page → paths map
//! 2. [`emit`]    — render the classified element sequence to Markdown
//!    blocks, consuming the map for Image elements
//! 3. [`cleanup`] — deterministic text rules normalising OCR artefacts

pub mod cleanup;
pub mod emit;
pub mod extract;
