//! Structured document elements produced by the layout-extraction service.
//!
//! The OCR/layout collaborator is a black box: it partitions a PDF into an
//! ordered sequence of classified elements, each carrying a category label,
//! the recognised text, the page it came from, and — for detected tables —
//! an HTML markup rendering of the table structure. This module gives those
//! records a typed shape and loads them from the collaborator's JSON output.
//!
//! Elements are produced once per extraction run and read-only afterwards.

use crate::error::PdfMdError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The fixed category label set emitted by the layout-extraction service.
///
/// Labels outside the set parse to [`ElementCategory::Other`]; rendering
/// treats unknown categories as plain text rather than an error, so a new
/// label on the collaborator side degrades gracefully instead of breaking
/// the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementCategory {
    Title,
    Header,
    Subheader,
    List,
    Table,
    Image,
    Text,
    /// Any label outside the fixed set.
    Other,
}

impl ElementCategory {
    /// Map a collaborator label to a category. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Title" => Self::Title,
            "Header" => Self::Header,
            "Subheader" => Self::Subheader,
            "List" | "ListItem" => Self::List,
            "Table" => Self::Table,
            "Image" => Self::Image,
            "Text" | "NarrativeText" | "UncategorizedText" => Self::Text,
            _ => Self::Other,
        }
    }
}

/// One structurally classified unit of extracted document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentElement {
    /// Category label assigned by the layout-extraction service.
    pub category: ElementCategory,
    /// Recognised text content; may be empty.
    pub text: String,
    /// 1-based page number the element was found on.
    pub page: usize,
    /// HTML markup of the detected table structure, when the collaborator
    /// inferred one. Only meaningful for `Table` elements.
    pub table_html: Option<String>,
}

impl DocumentElement {
    /// Convenience constructor for elements without table markup.
    pub fn new(category: ElementCategory, text: impl Into<String>, page: usize) -> Self {
        Self {
            category,
            text: text.into(),
            page,
            table_html: None,
        }
    }
}

// ── JSON ingestion ───────────────────────────────────────────────────────
//
// The collaborator serialises elements as a JSON array of records shaped
// like: {"type": "Title", "text": "...", "metadata": {"page_number": 1,
// "text_as_html": "<table>...</table>"}}. Some emitters spell the label key
// "category" instead of "type"; both are accepted.

#[derive(Deserialize)]
struct RawElement {
    #[serde(alias = "category")]
    r#type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Deserialize, Default)]
struct RawMetadata {
    #[serde(default = "default_page")]
    page_number: usize,
    #[serde(default)]
    text_as_html: Option<String>,
}

fn default_page() -> usize {
    1
}

impl From<RawElement> for DocumentElement {
    fn from(raw: RawElement) -> Self {
        // Empty table markup is treated as absent so the emitter falls back
        // to the element's raw text.
        let table_html = raw.metadata.text_as_html.filter(|h| !h.trim().is_empty());
        Self {
            category: ElementCategory::from_label(&raw.r#type),
            text: raw.text,
            page: raw.metadata.page_number.max(1),
            table_html,
        }
    }
}

/// Parse a collaborator element array from a JSON string.
pub fn elements_from_json(json: &str) -> Result<Vec<DocumentElement>, serde_json::Error> {
    let raw: Vec<RawElement> = serde_json::from_str(json)?;
    Ok(raw.into_iter().map(DocumentElement::from).collect())
}

/// Load a collaborator element array from a JSON file.
pub fn load_elements(path: &Path) -> Result<Vec<DocumentElement>, PdfMdError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PdfMdError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else if e.kind() == std::io::ErrorKind::PermissionDenied {
            PdfMdError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            PdfMdError::Internal(format!("Failed to read '{}': {e}", path.display()))
        }
    })?;

    elements_from_json(&json).map_err(|e| PdfMdError::MalformedElements {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_mapping() {
        assert_eq!(ElementCategory::from_label("Title"), ElementCategory::Title);
        assert_eq!(ElementCategory::from_label("ListItem"), ElementCategory::List);
        assert_eq!(
            ElementCategory::from_label("NarrativeText"),
            ElementCategory::Text
        );
        assert_eq!(
            ElementCategory::from_label("PageBreak"),
            ElementCategory::Other
        );
    }

    #[test]
    fn parse_collaborator_json() {
        let json = r#"[
            {"type": "Title", "text": "Report", "metadata": {"page_number": 1}},
            {"category": "Table", "text": "a b", "metadata": {"page_number": 2, "text_as_html": "<table><tr><td>a</td><td>b</td></tr></table>"}},
            {"type": "Image", "text": "", "metadata": {"page_number": 2}}
        ]"#;
        let elements = elements_from_json(json).unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].category, ElementCategory::Title);
        assert_eq!(elements[0].page, 1);
        assert!(elements[1].table_html.is_some());
        assert_eq!(elements[2].category, ElementCategory::Image);
    }

    #[test]
    fn empty_table_html_treated_as_absent() {
        let json = r#"[{"type": "Table", "text": "raw", "metadata": {"page_number": 1, "text_as_html": "  "}}]"#;
        let elements = elements_from_json(json).unwrap();
        assert_eq!(elements[0].table_html, None);
    }

    #[test]
    fn missing_metadata_defaults_to_page_one() {
        let json = r#"[{"type": "Text", "text": "hello"}]"#;
        let elements = elements_from_json(json).unwrap();
        assert_eq!(elements[0].page, 1);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let err = load_elements(Path::new("/no/such/elements.json")).unwrap_err();
        assert!(matches!(err, PdfMdError::FileNotFound { .. }));
    }
}
