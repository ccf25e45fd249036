//! CLI binary for pdfmd.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use pdfmd::{convert_to_file, load_elements, ConversionConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert, deriving the document id from the file name
  pdfmd document.pdf --elements document.json
  # → document.md + document/page<N>_img<M>.png

  # Explicit id and output directory
  pdfmd report.pdf --elements report.json --id 1 --output-root out
  # → out/1.md + out/1/

  # Encrypted document
  pdfmd secret.pdf --elements secret.json --password hunter2

  # Structured stats for scripting
  pdfmd document.pdf --elements document.json --json

ELEMENT INPUT:
  --elements takes the JSON array produced by the layout-extraction
  service: records with a "type"/"category" label, "text", and a
  "metadata" object carrying "page_number" and (for tables)
  "text_as_html".

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Directory containing the pdfium shared library;
                    used when --pdfium-lib-path is not given.

AFTER CONVERSION:
  Run `pdfmd-rename <id> [prefix]` to prefix-rename the referenced
  images and delete the unreferenced ones.
"#;

/// Convert an OCR-classified PDF to Markdown with extracted images.
#[derive(Parser, Debug)]
#[command(
    name = "pdfmd",
    version,
    about = "Convert an OCR-classified PDF to Markdown with extracted images",
    long_about = "Convert a PDF document to Markdown using the classified element output of a \
layout-extraction service. Embedded raster images are extracted to PNG files and wired into \
the Markdown as image links.",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// JSON file with the layout-extraction service's element array.
    #[arg(short, long, env = "PDFMD_ELEMENTS")]
    elements: PathBuf,

    /// Document identifier; names the Markdown file and the image
    /// directory. Default: the PDF file stem.
    #[arg(long, env = "PDFMD_ID")]
    id: Option<String>,

    /// Parent directory for <id>.md and <id>/.
    #[arg(long, env = "PDFMD_OUTPUT_ROOT", default_value = ".")]
    output_root: PathBuf,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFMD_PASSWORD")]
    password: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Output run statistics as JSON instead of a summary line.
    #[arg(long, env = "PDFMD_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFMD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFMD_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Derive the document id ───────────────────────────────────────────
    let doc_id = match cli.id {
        Some(ref id) => id.clone(),
        None => cli
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("Cannot derive a document id from the input path; pass --id")?,
    };

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ConversionConfig::builder().output_root(&cli.output_root);
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Load elements and run ────────────────────────────────────────────
    let elements = load_elements(&cli.elements)
        .with_context(|| format!("Failed to load elements from {:?}", cli.elements))?;

    let output = convert_to_file(&cli.input, &elements, &doc_id, &config)
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        eprintln!(
            "✔ {} → {} ({} pages, {} images extracted, {} referenced, {}ms)",
            cli.input.display(),
            config.markdown_path(&doc_id).display(),
            output.stats.total_pages,
            output.stats.images_extracted,
            output.stats.images_referenced,
            output.stats.total_duration_ms,
        );
        if !output.stats.skipped_images.is_empty() {
            eprintln!("  {} images skipped:", output.stats.skipped_images.len());
            for skip in &output.stats.skipped_images {
                eprintln!("    {skip}");
            }
        }
    }

    Ok(())
}
