//! Markdown emission: turn the classified element sequence into an ordered
//! Markdown document, wiring Image elements to the extracted files.
//!
//! ## Dispatch
//!
//! Rendering is a single match over [`ElementCategory`] with a verbatim-text
//! default arm, so an unrecognised category degrades to plain text instead
//! of failing the run.
//!
//! ## Image de-duplication
//!
//! An Image element emits one reference per extracted image of *its own
//! page* that has not been referenced anywhere earlier in the document. The
//! de-duplication is global and keyed by path: a page with more Image
//! elements than extracted images simply emits nothing for the surplus
//! elements, and a path shared between pages is emitted only once.

use crate::element::{DocumentElement, ElementCategory};
use crate::output::ImagePathMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

/// Result of one emission pass.
#[derive(Debug)]
pub struct EmittedDocument {
    /// Ordered line-blocks; serialised with blank lines between blocks.
    pub blocks: Vec<String>,
    /// Number of image references emitted.
    pub images_referenced: usize,
}

impl EmittedDocument {
    /// Serialise as UTF-8 text, blocks separated by blank lines.
    pub fn to_markdown(&self) -> String {
        let mut text = self.blocks.join("\n\n");
        text.push('\n');
        text
    }
}

/// Render the element sequence into Markdown blocks.
///
/// `doc_id` becomes the directory segment of every emitted image link:
/// `![Image](./<doc_id>/<file_name>)`.
pub fn render_elements(
    elements: &[DocumentElement],
    image_map: &ImagePathMap,
    doc_id: &str,
) -> EmittedDocument {
    let mut blocks = Vec::with_capacity(elements.len());
    let mut inserted: HashSet<PathBuf> = HashSet::new();
    let mut images_referenced = 0usize;

    for el in elements {
        match el.category {
            ElementCategory::List if el.text.trim_start().starts_with("- ") => {
                blocks.push(el.text.clone());
            }
            ElementCategory::Title => {
                blocks.push(format!("# {}", el.text));
            }
            ElementCategory::Header | ElementCategory::Subheader => {
                blocks.push(format!("## {}", el.text));
            }
            ElementCategory::Table => match el.table_html.as_deref() {
                Some(html) => {
                    let table = html_table_to_markdown(html);
                    if table.is_empty() {
                        // Markup present but no parseable rows: raw text.
                        blocks.push(el.text.clone());
                    } else {
                        blocks.push(table);
                    }
                }
                None => blocks.push(el.text.clone()),
            },
            ElementCategory::Image => {
                for path in image_map.get(&el.page).map(Vec::as_slice).unwrap_or(&[]) {
                    if inserted.contains(path) {
                        continue;
                    }
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    blocks.push(format!("![Image](./{doc_id}/{file_name})"));
                    inserted.insert(path.clone());
                    images_referenced += 1;
                }
            }
            // List without "- ", Text, and anything else: verbatim.
            _ => blocks.push(el.text.clone()),
        }
    }

    debug!(
        "Emitted {} blocks, {} image references",
        blocks.len(),
        images_referenced
    );

    EmittedDocument {
        blocks,
        images_referenced,
    }
}

// ── HTML table conversion ────────────────────────────────────────────────
//
// The layout-extraction service renders detected tables as plain HTML
// (`<table><tr><td>…`). Converting that to a GFM pipe table keeps the
// Markdown readable without pulling in a full HTML parser: rows and cells
// are regular enough for regexes, and anything unexpected collapses to the
// raw-text fallback above.

static RE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap());
static RE_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<t[hd][^>]*>(.*?)</t[hd]>").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Convert an HTML table fragment into a GFM pipe table.
///
/// Returns an empty string when no rows can be parsed.
pub fn html_table_to_markdown(html: &str) -> String {
    let rows: Vec<Vec<String>> = RE_ROW
        .captures_iter(html)
        .map(|row| {
            RE_CELL
                .captures_iter(&row[1])
                .map(|cell| clean_cell(&cell[1]))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        return String::new();
    }

    let col_count = rows.iter().map(Vec::len).max().unwrap_or(1);
    let mut lines = Vec::with_capacity(rows.len() + 1);

    for (i, row) in rows.iter().enumerate() {
        let mut cells = row.clone();
        cells.resize(col_count, String::new());
        lines.push(format!("| {} |", cells.join(" | ")));
        if i == 0 {
            let sep: Vec<&str> = std::iter::repeat("---").take(col_count).collect();
            lines.push(format!("| {} |", sep.join(" | ")));
        }
    }

    lines.join("\n")
}

/// Strip nested tags, unescape common entities, and escape pipes so cell
/// content cannot break the table structure.
fn clean_cell(cell: &str) -> String {
    let stripped = RE_TAG.replace_all(cell, " ");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace('|', "\\|")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
