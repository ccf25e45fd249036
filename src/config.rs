//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs between the extractor and the emitter, and to
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: explicit pdfium resolution
//! The pdfium shared library is an external collaborator resolved **once**,
//! at binding time, through a fixed fallback chain — explicit config value,
//! then the `PDFIUM_LIB_PATH` environment variable, then the system library
//! search — with a hard [`PdfMdError::PdfiumBindingFailed`] if nothing
//! resolves. The process environment is never mutated.

use crate::error::PdfMdError;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfmd::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_root("out")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Explicit path to the directory containing the pdfium shared library.
    ///
    /// When `None`, binding falls back to the `PDFIUM_LIB_PATH` environment
    /// variable and then to the system library search.
    pub pdfium_lib_path: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Parent directory for the output artifacts. Default: `.`.
    ///
    /// The converter writes `<output_root>/<doc_id>.md` and the extracted
    /// images under `<output_root>/<doc_id>/`.
    pub output_root: PathBuf,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pdfium_lib_path: None,
            password: None,
            output_root: PathBuf::from("."),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Markdown output path for a document identifier: `<output_root>/<id>.md`.
    pub fn markdown_path(&self, doc_id: &str) -> PathBuf {
        self.output_root.join(format!("{doc_id}.md"))
    }

    /// Image directory for a document identifier: `<output_root>/<id>/`.
    pub fn image_dir(&self, doc_id: &str) -> PathBuf {
        self.output_root.join(doc_id)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, PdfMdError> {
        let c = &self.config;
        if c.output_root.as_os_str().is_empty() {
            return Err(PdfMdError::InvalidConfig(
                "output_root must not be empty".into(),
            ));
        }
        if let Some(ref p) = c.pdfium_lib_path {
            if !p.exists() {
                return Err(PdfMdError::InvalidConfig(format!(
                    "pdfium_lib_path '{}' does not exist",
                    p.display()
                )));
            }
        }
        Ok(self.config)
    }
}

/// Bind to a pdfium library using the configured fallback chain.
///
/// Resolution order:
/// 1. [`ConversionConfig::pdfium_lib_path`], when set.
/// 2. The `PDFIUM_LIB_PATH` environment variable, when non-empty.
/// 3. The system library search (`bind_to_system_library`).
///
/// Each step is attempted at most once; the first configured step that fails
/// is a hard error rather than silently falling through, so a misconfigured
/// path is surfaced instead of masked by an unrelated system copy.
pub fn bind_pdfium(config: &ConversionConfig) -> Result<Pdfium, PdfMdError> {
    if let Some(ref dir) = config.pdfium_lib_path {
        return Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .map(Pdfium::new)
            .map_err(|e| {
                PdfMdError::PdfiumBindingFailed(format!("{e:?} (in {})", dir.display()))
            });
    }

    if let Ok(dir) = std::env::var("PDFIUM_LIB_PATH") {
        if !dir.is_empty() {
            return Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
                .map(Pdfium::new)
                .map_err(|e| PdfMdError::PdfiumBindingFailed(format!("{e:?} (in {dir})")));
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PdfMdError::PdfiumBindingFailed(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let config = ConversionConfig::default();
        assert_eq!(config.markdown_path("1"), PathBuf::from("./1.md"));
        assert_eq!(config.image_dir("1"), PathBuf::from("./1"));
    }

    #[test]
    fn builder_output_root() {
        let config = ConversionConfig::builder()
            .output_root("out")
            .build()
            .unwrap();
        assert_eq!(config.markdown_path("report"), PathBuf::from("out/report.md"));
        assert_eq!(config.image_dir("report"), PathBuf::from("out/report"));
    }

    #[test]
    fn builder_rejects_empty_output_root() {
        let err = ConversionConfig::builder().output_root("").build();
        assert!(matches!(err, Err(PdfMdError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_missing_pdfium_path() {
        let err = ConversionConfig::builder()
            .pdfium_lib_path("/no/such/dir/anywhere")
            .build();
        assert!(matches!(err, Err(PdfMdError::InvalidConfig(_))));
    }
}
