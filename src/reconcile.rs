//! Reference reconciliation: match Markdown image references to files on
//! disk, rename the referenced files with a prefix, rewrite the references,
//! and prune everything unreferenced.
//!
//! ## Structure
//!
//! The run is three pure steps connected by explicit data, bracketed by
//! file-system work:
//!
//! ```text
//! scan_references ──▶ plan_renames ──▶ rewrite_references
//! (Markdown text)     (RenameMapping)  (new Markdown text)
//! ```
//!
//! [`scan_references`] and [`rewrite_references`] never touch the disk, and
//! [`plan_renames`] only reads the inventory it is handed, so the rewrite
//! logic is testable in isolation. [`reconcile`] orchestrates the full run.
//!
//! ## Safety ordering
//!
//! Originals are **copied** to their prefixed names, never renamed in
//! place; the pre-rename file is deleted only at the very end, after the
//! Markdown has been rewritten and persisted. A crash mid-run therefore
//! leaves every original recoverable. The rewritten Markdown is computed
//! fully in memory and written through a temp-file persist, so a write
//! failure cannot leave the file half-rewritten.

use crate::error::{FileOpError, PdfMdError};
use crate::output::ReconcileReport;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// One image reference found in the Markdown text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// The full reference path as it appears inside the link construct,
    /// e.g. `./1/page2_img1.png`.
    pub reference: String,
    /// The bare file name segment, e.g. `page2_img1.png`.
    pub file_name: String,
}

/// Original file name → prefixed file name. Built once per run; keys unique.
pub type RenameMapping = BTreeMap<String, String>;

/// Scan Markdown text for image references of the form
/// `![…](./<doc_id>/<file>)`, tolerating `\` as the path separator.
///
/// Duplicate references to the same file are all collected. Anything that
/// does not match the convention is simply not a reference — malformed
/// links are non-matches, never errors.
pub fn scan_references(markdown: &str, doc_id: &str) -> Vec<ImageReference> {
    // doc_id is user input; escape it so identifiers with regex
    // metacharacters cannot change the pattern.
    let pattern = format!(
        r"!\[[^\]]*\]\((\./{}[/\\]([^)]+))\)",
        regex::escape(doc_id)
    );
    let re = Regex::new(&pattern).expect("reference pattern is valid for any escaped doc_id");

    re.captures_iter(markdown)
        .map(|caps| ImageReference {
            reference: caps[1].to_string(),
            file_name: caps[2].to_string(),
        })
        .collect()
}

/// Compute the rename plan: every referenced file present in the inventory
/// maps to `<prefix>_<name>`.
///
/// Files already carrying the `<prefix>_` prefix are left out of the plan,
/// so a second run with the same prefix is a no-op instead of producing
/// double-prefixed names.
///
/// The guard is purely name-based: a file whose original name happens to
/// start with `<prefix>_` (say prefix `page2` against `page2_img1.png`) is
/// indistinguishable from a previously renamed file and is skipped too.
/// Both cases present a referenced inventory file starting with
/// `<prefix>_` whose unprefixed form is absent, so no local rule can tell
/// them apart; pick a prefix that is not a leading segment of the image
/// names.
pub fn plan_renames(
    references: &[ImageReference],
    inventory: &BTreeSet<String>,
    prefix: &str,
) -> RenameMapping {
    let already_prefixed = format!("{prefix}_");
    let mut mapping = RenameMapping::new();

    for reference in references {
        if !inventory.contains(&reference.file_name) {
            continue;
        }
        if reference.file_name.starts_with(&already_prefixed) {
            continue;
        }
        mapping
            .entry(reference.file_name.clone())
            .or_insert_with(|| format!("{prefix}_{}", reference.file_name));
    }

    mapping
}

/// Rewrite every occurrence of each renamed reference, substituting only
/// the file-name segment. Pure: returns the new Markdown text.
pub fn rewrite_references(
    markdown: &str,
    references: &[ImageReference],
    mapping: &RenameMapping,
) -> String {
    let mut out = markdown.to_string();
    for reference in references {
        if let Some(new_name) = mapping.get(&reference.file_name) {
            let new_reference = reference.reference.replace(&reference.file_name, new_name);
            out = out.replace(&reference.reference, &new_reference);
        }
    }
    out
}

/// Reconcile `md_path` against `image_dir`: rename referenced images with
/// `prefix`, rewrite the Markdown, delete orphans and superseded originals.
///
/// `doc_id` is the directory segment used in the reference convention
/// (normally the image directory's name).
///
/// Fails with a NotFound-kind error *before any mutation* when the Markdown
/// file or the image directory is missing. Per-file copy/delete failures do
/// not abort the run; they are logged, recorded in the report, and the
/// affected original is retained.
pub fn reconcile(
    md_path: &Path,
    image_dir: &Path,
    doc_id: &str,
    prefix: &str,
) -> Result<ReconcileReport, PdfMdError> {
    // ── Preconditions: fail before touching anything ─────────────────────
    if !md_path.is_file() {
        return Err(PdfMdError::FileNotFound {
            path: md_path.to_path_buf(),
        });
    }
    if !image_dir.is_dir() {
        return Err(PdfMdError::DirectoryNotFound {
            path: image_dir.to_path_buf(),
        });
    }

    let markdown = std::fs::read_to_string(md_path).map_err(|e| {
        PdfMdError::Internal(format!("Failed to read '{}': {e}", md_path.display()))
    })?;

    // ── Step 1: Scan ─────────────────────────────────────────────────────
    let references = scan_references(&markdown, doc_id);
    info!(
        "Found {} image references in {}",
        references.len(),
        md_path.display()
    );

    // ── Step 2: Inventory ────────────────────────────────────────────────
    let inventory = list_files(image_dir)?;
    info!("Image directory holds {} files", inventory.len());

    // ── Step 3: Rename plan, executed as copy-then-delete-later ──────────
    let mut mapping = plan_renames(&references, &inventory, prefix);
    let mut failures = Vec::new();

    let mut failed_keys = Vec::new();
    for (old_name, new_name) in &mapping {
        let old_path = image_dir.join(old_name);
        let new_path = image_dir.join(new_name);
        match std::fs::copy(&old_path, &new_path) {
            Ok(_) => debug!("Copied {old_name} -> {new_name}"),
            Err(e) => {
                let failure = FileOpError::CopyFailed {
                    name: old_name.clone(),
                    new_name: new_name.clone(),
                    detail: e.to_string(),
                };
                warn!("{failure}");
                failures.push(failure);
                failed_keys.push(old_name.clone());
            }
        }
    }
    // A failed copy keeps its original untouched: drop it from the mapping
    // so neither the rewrite nor the final delete sees it.
    for key in failed_keys {
        mapping.remove(&key);
    }

    // ── Step 4: Rewrite, persisted in one pass ───────────────────────────
    let rewritten = rewrite_references(&markdown, &references, &mapping);
    if rewritten != markdown {
        persist_markdown(md_path, &rewritten)?;
        info!("Rewrote {} references", mapping.len());
    }

    // ── Step 5: Prune unreferenced files ─────────────────────────────────
    let referenced: BTreeSet<&str> = references.iter().map(|r| r.file_name.as_str()).collect();
    let mut pruned = Vec::new();
    for name in &inventory {
        if referenced.contains(name.as_str()) {
            continue;
        }
        match std::fs::remove_file(image_dir.join(name)) {
            Ok(()) => {
                debug!("Pruned unreferenced {name}");
                pruned.push(name.clone());
            }
            Err(e) => {
                let failure = FileOpError::DeleteFailed {
                    name: name.clone(),
                    detail: e.to_string(),
                };
                warn!("{failure}");
                failures.push(failure);
            }
        }
    }

    // ── Step 6: Finalize — drop the pre-rename originals ─────────────────
    for old_name in mapping.keys() {
        match std::fs::remove_file(image_dir.join(old_name)) {
            Ok(()) => debug!("Removed original {old_name}"),
            Err(e) => {
                let failure = FileOpError::DeleteFailed {
                    name: old_name.clone(),
                    detail: e.to_string(),
                };
                warn!("{failure}");
                failures.push(failure);
            }
        }
    }

    info!(
        "Reconciliation done: {} renamed, {} pruned, {} failures",
        mapping.len(),
        pruned.len(),
        failures.len()
    );

    Ok(ReconcileReport {
        references_found: references.len(),
        renamed: mapping,
        pruned,
        failures,
    })
}

/// Bare names of the regular files directly inside `dir` (non-recursive).
fn list_files(dir: &Path) -> Result<BTreeSet<String>, PdfMdError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        PdfMdError::Internal(format!("Failed to list '{}': {e}", dir.display()))
    })?;

    let mut names = BTreeSet::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| PdfMdError::Internal(format!("Directory entry error: {e}")))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Replace `md_path` with `content` via write-then-persist in the target
/// directory, so a failure never leaves a partially written file.
fn persist_markdown(md_path: &Path, content: &str) -> Result<(), PdfMdError> {
    let dir = md_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| PdfMdError::OutputWriteFailed {
            path: md_path.to_path_buf(),
            source: e,
        })?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| PdfMdError::OutputWriteFailed {
            path: md_path.to_path_buf(),
            source: e,
        })?;
    tmp.persist(md_path)
        .map_err(|e| PdfMdError::OutputWriteFailed {
            path: md_path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scan_finds_forward_slash_references() {
        let md = "text\n![Image](./1/page2_img1.png)\nmore";
        let refs = scan_references(md, "1");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].reference, "./1/page2_img1.png");
        assert_eq!(refs[0].file_name, "page2_img1.png");
    }

    #[test]
    fn scan_finds_backslash_references() {
        let md = r"![Image](./1\page8_img1.png)";
        let refs = scan_references(md, "1");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].file_name, "page8_img1.png");
    }

    #[test]
    fn scan_keeps_duplicates() {
        let md = "![Image](./1/a.png)\n![Image](./1/a.png)";
        let refs = scan_references(md, "1");
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn scan_ignores_other_doc_ids_and_plain_links() {
        let md = "![Image](./2/a.png)\n[link](./1/a.png)\n![Image](https://x/a.png)";
        let refs = scan_references(md, "1");
        assert!(refs.is_empty());
    }

    #[test]
    fn scan_escapes_doc_id_metacharacters() {
        let md = "![Image](./a.b/img.png)\n![Image](./aXb/img2.png)";
        let refs = scan_references(md, "a.b");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].file_name, "img.png");
    }

    #[test]
    fn plan_maps_only_referenced_inventory_files() {
        let refs = scan_references("![Image](./1/a.png)\n![Image](./1/gone.png)", "1");
        let mapping = plan_renames(&refs, &inventory(&["a.png", "b.png"]), "doc");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["a.png"], "doc_a.png");
    }

    #[test]
    fn plan_skips_already_prefixed_files() {
        let refs = scan_references("![Image](./1/doc_a.png)", "1");
        let mapping = plan_renames(&refs, &inventory(&["doc_a.png"]), "doc");
        assert!(mapping.is_empty(), "must not double-prefix");
    }

    #[test]
    fn plan_treats_prefix_colliding_names_as_already_renamed() {
        // Documented trade-off of the name-based guard: a prefix that is a
        // leading segment of an original name skips that file.
        let refs = scan_references("![Image](./1/page2_img1.png)", "1");
        let mapping = plan_renames(&refs, &inventory(&["page2_img1.png"]), "page2");
        assert!(mapping.is_empty());
    }

    #[test]
    fn plan_deduplicates_repeated_references() {
        let refs = scan_references("![Image](./1/a.png)\n![Image](./1/a.png)", "1");
        let mapping = plan_renames(&refs, &inventory(&["a.png"]), "x");
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn rewrite_replaces_every_occurrence() {
        let md = "![Image](./1/a.png)\nsee also ![Image](./1/a.png)";
        let refs = scan_references(md, "1");
        let mapping = plan_renames(&refs, &inventory(&["a.png"]), "x");
        let out = rewrite_references(md, &refs, &mapping);
        assert_eq!(out.matches("./1/x_a.png").count(), 2);
        assert!(!out.contains("(./1/a.png)"));
    }

    #[test]
    fn rewrite_touches_only_filename_segment() {
        let md = r"![Image](./1\page2_img1.png)";
        let refs = scan_references(md, "1");
        let mapping = plan_renames(&refs, &inventory(&["page2_img1.png"]), "doc");
        let out = rewrite_references(md, &refs, &mapping);
        assert_eq!(out, r"![Image](./1\doc_page2_img1.png)");
    }

    #[test]
    fn rewrite_without_mapping_is_identity() {
        let md = "![Image](./1/a.png)";
        let refs = scan_references(md, "1");
        let out = rewrite_references(md, &refs, &RenameMapping::new());
        assert_eq!(out, md);
    }
}
