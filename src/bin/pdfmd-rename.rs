//! CLI binary for reconciling a converted document's image references.
//!
//! Takes a document identifier, resolves `<ID>.md` and the `<ID>/` image
//! directory next to it, and runs the reconciler: referenced images are
//! copied to `<PREFIX>_<name>`, the Markdown links are rewritten, and both
//! the unreferenced files and the pre-rename originals are deleted.

use anyhow::{Context, Result};
use clap::Parser;
use pdfmd::reconcile;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Default prefix "<ID>_"
  pdfmd-rename 1
  # 1/page2_img1.png → 1/1__page2_img1.png, links in 1.md rewritten

  # Explicit prefix
  pdfmd-rename 1 dify
  # 1/page2_img1.png → 1/dify_page2_img1.png

  # Converted into a different directory
  pdfmd-rename report --root out

BEHAVIOUR:
  Referenced images are copied (not moved) to their prefixed names
  before anything is deleted, so an interrupted run never loses a file.
  Files in the image directory that no Markdown link references are
  deleted. Re-running with the same prefix is a no-op.
"#;

/// Rename a document's referenced images with a prefix and prune orphans.
#[derive(Parser, Debug)]
#[command(
    name = "pdfmd-rename",
    version,
    about = "Rename a document's referenced images with a prefix and prune orphans",
    long_about = "Reconcile a converted Markdown document against its image directory: find \
every image reference, copy the referenced files to prefixed names, rewrite the references, \
and delete both unreferenced images and the pre-rename originals.",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document identifier; resolves <ID>.md and the <ID>/ image directory.
    id: String,

    /// Prefix for renamed files. Default: "<ID>_".
    prefix: Option<String>,

    /// Directory containing <ID>.md and <ID>/.
    #[arg(long, env = "PDFMD_OUTPUT_ROOT", default_value = ".")]
    root: PathBuf,

    /// Output the reconciliation report as JSON.
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

    let prefix = cli
        .prefix
        .clone()
        .unwrap_or_else(|| format!("{}_", cli.id));

    let md_path = cli.root.join(format!("{}.md", cli.id));
    let image_dir = cli.root.join(&cli.id);

    if !cli.quiet {
        eprintln!("Markdown file:   {}", md_path.display());
        eprintln!("Image directory: {}", image_dir.display());
        eprintln!("Prefix:          {prefix}");
    }

    let report = reconcile(&md_path, &image_dir, &cli.id, &prefix)
        .context("Reconciliation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
        return Ok(());
    }

    if !cli.quiet {
        for (old, new) in &report.renamed {
            eprintln!("  renamed  {old} → {new}");
        }
        for name in &report.pruned {
            eprintln!("  pruned   {name}");
        }
        for failure in &report.failures {
            eprintln!("  FAILED   {failure}");
        }
        eprintln!(
            "{} {} references, {} renamed, {} pruned{}",
            if report.is_clean() { "✔" } else { "⚠" },
            report.references_found,
            report.renamed.len(),
            report.pruned.len(),
            if report.is_clean() {
                String::new()
            } else {
                format!(", {} failures", report.failures.len())
            },
        );
    }

    Ok(())
}
