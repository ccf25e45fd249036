//! Deterministic cleanup of the assembled Markdown document.
//!
//! Element text arrives from the layout-extraction service with OCR
//! artefacts: Windows line endings, trailing whitespace, invisible Unicode
//! (zero-width spaces, BOMs, soft hyphens), and elements whose empty text
//! produces runs of blank lines. These rules normalise the document without
//! touching content; in particular they never remove or reorder image
//! references, which the reconciler depends on.
//!
//! Each rule is a pure `&str → String` function with no shared state, run
//! in a fixed order: line endings first so the line-based rules see clean
//! input, the final-newline pass last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the emitted Markdown.
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_ensure_final_newline() {
        assert_eq!(ensure_final_newline("hello"), "hello\n");
        assert_eq!(ensure_final_newline("hello\n\n\n"), "hello\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }

    #[test]
    fn image_references_survive_cleanup() {
        let input = "# Title\r\n\r\n\r\n![Image](./1/page2_img1.png)   \r\n";
        let result = clean_markdown(input);
        assert!(result.contains("![Image](./1/page2_img1.png)"));
        assert!(result.ends_with('\n'));
        assert!(!result.contains("\n\n\n"));
    }
}
