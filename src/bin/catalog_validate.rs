//! Validate a catalog document against the bundled schema.
//!
//! Usage:
//!   catalog-validate --file books/books.json
//!   catalog-validate < books.json

use anyhow::{Context, Result};
use biblioteca::{CatalogSchema, init_logging};
use clap::Parser;
use serde_json::Value;
use std::fs::File;
use std::io::{Read, stdin};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-validate")]
#[command(about = "Validate a book catalog against the catalog schema")]
struct Cli {
    /// Optional input file; reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Optional schema override (defaults to the bundled schema).
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Log level: error, warn, info, debug or trace.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn read_input(file: Option<PathBuf>) -> Result<Value> {
    let mut buf = String::new();
    if let Some(path) = file {
        File::open(&path)
            .with_context(|| format!("opening input file {}", path.display()))?
            .read_to_string(&mut buf)
            .with_context(|| format!("reading input file {}", path.display()))?;
    } else {
        stdin()
            .read_to_string(&mut buf)
            .context("reading stdin for input JSON")?;
    }
    let value: Value = serde_json::from_str(&buf).context("parsing input JSON")?;
    Ok(value)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let input = read_input(cli.file)?;

    let schema = match &cli.schema {
        Some(path) => CatalogSchema::load(path)?,
        None => CatalogSchema::bundled()?,
    };
    schema.validate(&input)?;

    let count = input.as_array().map(Vec::len).unwrap_or_default();
    log::info!("catalog valid: {count} records");
    println!("ok: {count} records");
    Ok(())
}
