//! Output types: conversion results, statistics, and reconciliation reports.
//!
//! Everything here is serialisable so the CLIs can emit structured JSON
//! (`--json`) and so partial failures stay inspectable after the run.

use crate::error::{FileOpError, ImageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Mapping from 1-based page number to the image files extracted from that
/// page, in extraction order. A page with no embedded images maps to an
/// empty vector.
///
/// `BTreeMap` keeps iteration in page order, which keeps logs and JSON
/// output deterministic.
pub type ImagePathMap = BTreeMap<usize, Vec<PathBuf>>;

/// Result of a full PDF-to-Markdown conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled Markdown document.
    pub markdown: String,
    /// Page → extracted image paths, as consumed by the emitter.
    pub image_map: ImagePathMap,
    /// Run statistics, including non-fatal per-image failures.
    pub stats: ConversionStats,
}

/// Statistics for a conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Total pages in the source PDF.
    pub total_pages: usize,
    /// Embedded images successfully extracted to PNG files.
    pub images_extracted: usize,
    /// Embedded images skipped due to decode/save failures.
    ///
    /// Each skip is recorded here *and* logged at WARN; skips are never
    /// silently dropped.
    pub skipped_images: Vec<ImageError>,
    /// Document elements consumed by the emitter.
    pub elements: usize,
    /// Markdown image references emitted.
    pub images_referenced: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
}

/// Report of a reconciliation run: which files were renamed, which were
/// pruned, and which operations failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Image references found in the Markdown (duplicates included).
    pub references_found: usize,
    /// Original → prefixed file name for every successful rename.
    pub renamed: BTreeMap<String, String>,
    /// Inventoried files deleted because nothing referenced them.
    pub pruned: Vec<String>,
    /// Per-file copy/delete failures; the corresponding originals are
    /// retained.
    pub failures: Vec<FileOpError>,
}

impl ReconcileReport {
    /// True when every planned operation succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_clean_by_default() {
        let report = ReconcileReport::default();
        assert!(report.is_clean());
        assert_eq!(report.references_found, 0);
    }

    #[test]
    fn stats_serialise_roundtrip() {
        let stats = ConversionStats {
            total_pages: 3,
            images_extracted: 2,
            elements: 10,
            images_referenced: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: ConversionStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_pages, 3);
        assert_eq!(back.images_extracted, 2);
    }
}
