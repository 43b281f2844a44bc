//! Browse the book catalog from a terminal.
//!
//! One-shot mode prints the requested number of pages for a query/format and
//! exits. `--interactive` keeps the session open and reads commands from
//! stdin, one per line:
//!
//!   search <text>        filter by title/description, applied after 300ms
//!                        without another search
//!   format <fmt>         all | pdf | epub | mobi
//!   more                 load the next chunk
//!   read <n>             full description of card n
//!   download <n> [dir]   save card n (default dir: current directory)
//!   preview <n>          print the location card n opens
//!   stats                totals for the catalog and current view
//!   quit

use anyhow::{Context, Result, bail};
use biblioteca::render::{write_stats, write_text};
use biblioteca::{
    CatalogItem, CatalogState, Debouncer, FormatFilter, FsFetcher, Notice, SEARCH_DEBOUNCE,
    calculate_exact_mb, download, init_logging, library_root_for, plan_download, preview_target,
    render_pass, resolve_catalog_path,
};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "catalog-browse")]
#[command(about = "Search, filter and page through the book catalog")]
struct Cli {
    /// Catalog JSON path (defaults to BIBLIOTECA_CATALOG or <root>/books/books.json).
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Case-insensitive title/description filter.
    #[arg(long, default_value = "")]
    query: String,
    /// Format filter: all, pdf, epub or mobi.
    #[arg(long, default_value = "all")]
    format: FormatFilter,
    /// Number of chunks to expose.
    #[arg(long, default_value_t = 1)]
    pages: usize,
    /// Emit the rendered page as JSON.
    #[arg(long)]
    json: bool,
    /// Read commands from stdin instead of printing once.
    #[arg(long)]
    interactive: bool,
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
    let (mut state, notice) = CatalogState::load(&catalog_path);
    announce(&notice);

    state.set_format(cli.format);
    state.apply_filter(&cli.query);

    if cli.interactive {
        let fetcher = FsFetcher::new(library_root_for(&catalog_path));
        let stdout = io::stdout();
        return Session::new(state, fetcher).run(spawn_line_reader(), &mut stdout.lock());
    }

    for _ in 1..cli.pages {
        if !state.advance_page() {
            break;
        }
    }
    let page = render_pass(&mut state, &mut rand::thread_rng());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &page).context("writing page JSON")?;
        writeln!(out)?;
    } else {
        write_text(&page, &mut out)?;
    }
    Ok(())
}

fn announce(notice: &Notice) {
    notice.log();
    eprintln!("{notice}");
}

/// Forward stdin lines over a channel so the session can wait on the search
/// debounce and on input at the same time.
fn spawn_line_reader() -> Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

struct Session {
    state: CatalogState,
    fetcher: FsFetcher,
    searches: Debouncer<String>,
    // Cards on screen after the last render; "more" is offered only when the
    // last render said so.
    shown: usize,
    more_offered: bool,
}

impl Session {
    fn new(state: CatalogState, fetcher: FsFetcher) -> Self {
        Self {
            state,
            fetcher,
            searches: Debouncer::new(SEARCH_DEBOUNCE),
            shown: 0,
            more_offered: false,
        }
    }

    fn run(mut self, lines: Receiver<io::Result<String>>, out: &mut impl Write) -> Result<()> {
        self.render(out)?;
        loop {
            let received = match self.searches.deadline() {
                Some(deadline) => {
                    lines.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            let line = match received {
                Ok(line) => line.context("reading command from stdin")?,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(query) = self.searches.take_due(Instant::now()) {
                        self.search(&query, out)?;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
            let rest = rest.trim();

            if command == "search" {
                self.searches.push(rest.to_string(), Instant::now());
                continue;
            }
            if let Some(query) = self.searches.flush() {
                self.search(&query, out)?;
            }
            if !self.dispatch(command, rest, out)? {
                return Ok(());
            }
        }

        if let Some(query) = self.searches.flush() {
            self.search(&query, out)?;
        }
        Ok(())
    }

    /// Handle one non-search command. Returns `false` on quit.
    fn dispatch(&mut self, command: &str, rest: &str, out: &mut impl Write) -> Result<bool> {
        match command {
            "format" => match rest.parse::<FormatFilter>() {
                Ok(filter) => {
                    self.state.set_format(filter);
                    self.render(out)?;
                }
                Err(err) => writeln!(out, "{err}")?,
            },
            "more" => {
                if self.more_offered && self.state.advance_page() {
                    self.render(out)?;
                } else {
                    writeln!(out, "Nothing more to load.")?;
                }
            }
            "read" => match self.shown_item(rest) {
                Ok(item) => {
                    writeln!(out, "{}", item.title)?;
                    writeln!(out, "{}", item.description_text())?;
                }
                Err(err) => writeln!(out, "{err:#}")?,
            },
            "download" => {
                let (position, dir) = rest.split_once(' ').unwrap_or((rest, "."));
                match self.shown_item(position) {
                    Ok(item) => {
                        let item = item.clone();
                        self.download(&item, PathBuf::from(dir.trim()), out)?;
                    }
                    Err(err) => writeln!(out, "{err:#}")?,
                }
            }
            "preview" => match self.shown_item(rest) {
                Ok(item) => match preview_target(item) {
                    Some(url) => {
                        writeln!(out, "{url}")?;
                        announce(&Notice::preview_opened(
                            &item.title,
                            &calculate_exact_mb(item.size),
                        ));
                    }
                    None => writeln!(out, "No preview location for {}", item.title)?,
                },
                Err(err) => writeln!(out, "{err:#}")?,
            },
            "stats" => write_stats(&self.state.stats(), out)?,
            "quit" | "exit" => return Ok(false),
            other => writeln!(out, "unknown command: {other}")?,
        }
        Ok(true)
    }

    fn search(&mut self, query: &str, out: &mut impl Write) -> Result<()> {
        self.state.apply_filter(query);
        self.render(out)
    }

    fn render(&mut self, out: &mut impl Write) -> Result<()> {
        let page = render_pass(&mut self.state, &mut rand::thread_rng());
        self.shown = page.cards.len();
        self.more_offered = page.has_more;
        write_text(&page, out)?;
        out.flush()?;
        Ok(())
    }

    /// Card `n` (1-based) among the cards on screen.
    fn shown_item(&self, raw: &str) -> Result<&CatalogItem> {
        let position: usize = raw
            .trim()
            .parse()
            .with_context(|| format!("expected a card number, got {raw:?}"))?;
        if position == 0 || position > self.shown {
            bail!("no card {position} in the current view");
        }
        self.state
            .filtered()
            .nth(position - 1)
            .with_context(|| format!("no card {position} in the current view"))
    }

    fn download(&self, item: &CatalogItem, dir: PathBuf, out: &mut impl Write) -> Result<()> {
        let plan = plan_download(item, self.state.format());
        announce(&plan.started_notice());
        let outcome = download(&plan, &self.fetcher, &dir)?;
        announce(&outcome.notice(&plan));
        serde_json::to_writer(&mut *out, &outcome).context("writing download outcome")?;
        writeln!(out)?;
        Ok(())
    }
}
