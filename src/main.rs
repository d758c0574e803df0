//! # doc-suggest CLI (`dsg`)
//!
//! Operational surface for the suggestion core. The production transport
//! (HTTP + SSE) lives in a separate service; `dsg` exercises the same
//! library entry points from the command line.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dsg extract <file>` | Extract and print a document's text content |
//! | `dsg suggest <file> --units <units.toml>` | Suggest recipient units for a document |
//!
//! ## Examples
//!
//! ```bash
//! # Preview what the engine would read from an upload
//! dsg extract ./uploads/bao-cao-q3.pdf
//!
//! # One collapsed JSON result
//! dsg suggest ./uploads/bao-cao-q3.pdf --name "Báo cáo quý 3" --units ./units.toml
//!
//! # One JSON record per processed chunk
//! dsg suggest ./uploads/bao-cao-q3.pdf --units ./units.toml --stream
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use doc_suggest::config::{load_config, Config};
use doc_suggest::extract::extract_text;
use doc_suggest::models::{DocumentRef, Unit};
use doc_suggest::suggest::SuggestionEngine;

const DEFAULT_CONFIG_PATH: &str = "./config/dsg.toml";

/// doc-suggest CLI: extraction and recipient-unit suggestions for
/// uploaded office documents.
#[derive(Parser)]
#[command(
    name = "dsg",
    about = "AI-assisted recipient-unit suggestions for uploaded documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the default path does not exist, built-in defaults are used.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and print the text content of a document.
    ///
    /// Prints the extracted text and its character count, or explains why
    /// nothing could be extracted (e.g. a scanned PDF).
    Extract {
        /// Document file (.pdf, .doc, .docx, .xls, .xlsx).
        file: PathBuf,
    },

    /// Suggest recipient units for a document.
    ///
    /// Candidate units are read from a TOML file of `[[units]]` entries
    /// with `id`, `name`, and `code` fields. Output is JSON: one collapsed
    /// object, or one record per processed chunk with `--stream`.
    Suggest {
        /// Document file to suggest recipients for.
        file: PathBuf,

        /// Display name of the document (used by the keyword fallback when
        /// no text can be extracted). Defaults to the file name.
        #[arg(long)]
        name: Option<String>,

        /// TOML file listing candidate units.
        #[arg(long)]
        units: PathBuf,

        /// Emit one JSON record per processed chunk instead of a single
        /// collapsed result.
        #[arg(long)]
        stream: bool,
    },
}

#[derive(Deserialize)]
struct UnitsFile {
    units: Vec<Unit>,
}

fn load_units(path: &PathBuf) -> Result<Vec<Unit>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read units file: {}", path.display()))?;
    let file: UnitsFile = toml::from_str(&content).with_context(|| "Failed to parse units file")?;
    Ok(file.units)
}

fn resolve_config(path: &PathBuf) -> Result<Config> {
    if !path.exists() && path == &PathBuf::from(DEFAULT_CONFIG_PATH) {
        return Ok(Config::default());
    }
    load_config(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli.config)?;

    match cli.command {
        Commands::Extract { file } => {
            match extract_text(&file, &config.extraction) {
                Some(text) => {
                    println!("{}", text);
                    println!();
                    println!("extracted characters: {}", text.chars().count());
                }
                None => {
                    let is_pdf = file
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
                    eprintln!("No text content could be extracted from {}.", file.display());
                    if is_pdf {
                        eprintln!(
                            "This PDF may be a scanned/image-only document with no readable text."
                        );
                    }
                }
            }
            Ok(())
        }

        Commands::Suggest {
            file,
            name,
            units,
            stream,
        } => {
            let units = load_units(&units)?;
            let display_name = name.unwrap_or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            let document = DocumentRef::new(display_name, file);
            let engine = Arc::new(SuggestionEngine::new(config));

            if stream {
                let mut rx = engine.suggest_stream(document, units);
                while let Some(record) = rx.recv().await {
                    println!("{}", serde_json::to_string(&record)?);
                }
            } else {
                let result = engine.suggest(&document, &units).await;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Ok(())
        }
    }
}
