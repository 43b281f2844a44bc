//! Download one catalog item by title match or position.
//!
//! Usage:
//!   catalog-download --match casmurro --format epub --dest ~/Downloads
//!   catalog-download --position 3 --dry-run

use anyhow::{Context, Result, bail};
use biblioteca::{
    CatalogItem, FormatFilter, FsFetcher, download, init_logging, library_root_for,
    load_catalog, plan_download, resolve_catalog_path,
};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-download")]
#[command(about = "Save a catalog item under a sanitized file name")]
struct Cli {
    /// Catalog JSON path (defaults to BIBLIOTECA_CATALOG or <root>/books/books.json).
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Case-insensitive title substring; must match exactly one item.
    #[arg(long = "match", conflicts_with = "position")]
    title_match: Option<String>,
    /// 1-based position in the catalog.
    #[arg(long, required_unless_present = "title_match")]
    position: Option<usize>,
    /// Requested format: all, pdf, epub or mobi.
    #[arg(long, default_value = "all")]
    format: FormatFilter,
    /// Directory to save into.
    #[arg(long, default_value = ".")]
    dest: PathBuf,
    /// Print the download plan as JSON without fetching.
    #[arg(long)]
    dry_run: bool,
    /// Log level: error, warn, info, debug or trace.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let catalog_path = resolve_catalog_path(cli.catalog.clone())?;
    let items = load_catalog(&catalog_path)?;
    let item = select_item(&items, &cli)?;
    let plan = plan_download(item, cli.format);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.dry_run {
        serde_json::to_writer_pretty(&mut out, &plan).context("writing download plan")?;
        writeln!(out)?;
        return Ok(());
    }

    let started = plan.started_notice();
    started.log();
    eprintln!("{started}");

    let fetcher = FsFetcher::new(library_root_for(&catalog_path));
    let outcome = download(&plan, &fetcher, &cli.dest)?;
    let finished = outcome.notice(&plan);
    finished.log();
    eprintln!("{finished}");

    serde_json::to_writer(&mut out, &outcome).context("writing download outcome")?;
    writeln!(out)?;
    Ok(())
}

fn select_item<'a>(items: &'a [CatalogItem], cli: &Cli) -> Result<&'a CatalogItem> {
    if let Some(position) = cli.position {
        if position == 0 || position > items.len() {
            bail!(
                "position {position} out of range; catalog has {} items",
                items.len()
            );
        }
        return Ok(&items[position - 1]);
    }

    let needle = cli.title_match.as_deref().unwrap_or_default().to_lowercase();
    let matches: Vec<&CatalogItem> = items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .collect();
    match matches.as_slice() {
        [single] => Ok(*single),
        [] => bail!("no catalog item title contains {needle:?}"),
        many => bail!(
            "{} items match {needle:?}: {}",
            many.len(),
            many.iter()
                .map(|item| item.title.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
