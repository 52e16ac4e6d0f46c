use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kindlediff_core::{ExportConfig, ExportOutcome, KeyField, run_export};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "kindlediff",
    about = "Export new Kindle books as a zipped CSV diff against prior exports",
    version,
    long_about = None
)]
struct Cli {
    /// Kindle sync metadata cache (XML).
    #[arg(long, value_name = "FILE")]
    metadata_cache: Option<PathBuf>,

    /// Directory holding previously exported CSV snapshots.
    #[arg(long, value_name = "DIR")]
    snapshots: Option<PathBuf>,

    /// Directory the zip archive is written to.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Deduplication key: 'title' or 'asin'.
    #[arg(long)]
    key: Option<String>,

    /// Stem prefix of the exported CSV/zip pair.
    #[arg(long)]
    prefix: Option<String>,

    /// TOML config file; flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting KINDLEDIFF_JSON=1.
    #[arg(long)]
    json: bool,
}

fn build_config(cli: &Cli) -> Result<ExportConfig> {
    let mut config = match &cli.config {
        Some(path) => ExportConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExportConfig::default(),
    };

    if let Some(path) = &cli.metadata_cache {
        config.metadata_cache = path.clone();
    }
    if let Some(dir) = &cli.snapshots {
        config.snapshot_dir = dir.clone();
    }
    if let Some(dir) = &cli.output {
        config.output_dir = dir.clone();
    }
    if let Some(key) = &cli.key {
        config.key_field = KeyField::from_str(key)?;
    }
    if let Some(prefix) = &cli.prefix {
        config.file_prefix = prefix.clone();
    }

    Ok(config)
}

fn print_json(outcome: &ExportOutcome) -> Result<()> {
    let payload = serde_json::json!({
        "status": "ok",
        "data": outcome,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_human(outcome: &ExportOutcome) {
    for file in &outcome.snapshot_files {
        println!("Read snapshot: {}", file.display());
    }
    println!(
        "Extracted {} books, {} already exported.",
        outcome.extracted,
        outcome.extracted - outcome.new_records
    );
    match &outcome.archive {
        Some(archive) => {
            println!(
                "Exported {} new books to {}",
                archive.records,
                archive.zip_path.display()
            );
        }
        None => println!("No new books found."),
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("KINDLEDIFF_JSON").as_deref() == Ok("1");

    let config = build_config(&cli)?;
    tracing::debug!(
        cache = %config.metadata_cache.display(),
        snapshots = %config.snapshot_dir.display(),
        key = %config.key_field,
        "starting export"
    );
    let outcome = run_export(&config).with_context(|| {
        format!(
            "exporting diff of {}",
            config.metadata_cache.display()
        )
    })?;

    if json_output {
        print_json(&outcome)?;
    } else {
        print_human(&outcome);
    }

    Ok(())
}
