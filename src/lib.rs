//! Static book catalog browser.
//!
//! The crate loads a JSON list of book records once, then answers searches,
//! format filters and "load more" requests over it, and turns a chosen item
//! into a safe download. Binaries under `src/bin/` are thin front ends over
//! these modules.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod cover;
pub mod download;
pub mod filename;
pub mod format;
pub mod notice;
pub mod render;
pub mod schema;
pub mod size;

pub use catalog::{
    CHUNK_SIZE, CatalogItem, CatalogState, CatalogStats, DEFAULT_CATALOG_PATH, Debouncer,
    LONG_DESCRIPTION_THRESHOLD, SEARCH_DEBOUNCE, load_catalog, parse_catalog,
};
pub use download::{
    DownloadOutcome, DownloadPlan, Fetcher, FsFetcher, download, plan_download, preview_target,
};
pub use filename::build_download_name;
pub use format::{
    BookFormat, FormatFilter, canonical_format, item_has_format, resolve_download_href,
};
pub use notice::{Notice, NoticeLevel};
pub use render::{Card, RenderedPage, render_pass};
pub use schema::{CatalogSchema, validate_catalog_value};
pub use size::{calculate_exact_mb, format_size};

const ENV_ROOT: &str = "BIBLIOTECA_ROOT";
const ENV_CATALOG: &str = "BIBLIOTECA_CATALOG";

fn is_library_root(candidate: &Path) -> bool {
    candidate.join(DEFAULT_CATALOG_PATH).is_file()
}

fn library_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_library_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_library_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the directory holding `books/books.json`.
///
/// Checks `BIBLIOTECA_ROOT`, then the working directory and its ancestors,
/// then the executable's directory and its ancestors, then the build-time
/// `BIBLIOTECA_ROOT_HINT`.
pub fn find_library_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var(ENV_ROOT) {
        if let Some(root) = library_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(root) = search_upwards(&cwd) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("BIBLIOTECA_ROOT_HINT") {
        if let Some(root) = library_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate a library root containing {DEFAULT_CATALOG_PATH}. Set {ENV_ROOT} or pass --catalog."
    );
}

pub fn default_catalog_path(library_root: &Path) -> PathBuf {
    library_root.join(DEFAULT_CATALOG_PATH)
}

/// Catalog path from the CLI flag, `BIBLIOTECA_CATALOG`, or the library root.
pub fn resolve_catalog_path(cli: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli {
        return Ok(path);
    }
    match env::var(ENV_CATALOG) {
        Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(default_catalog_path(&find_library_root()?)),
    }
}

/// Directory hrefs in `catalog_path` are relative to.
///
/// A catalog at `<root>/books/books.json` serves hrefs like
/// `books/pdf/x.pdf`, so the root is two levels up; any other layout uses the
/// catalog's own directory.
pub fn library_root_for(catalog_path: &Path) -> PathBuf {
    let parent = catalog_path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    match (parent.file_name(), parent.parent()) {
        (Some(name), Some(grand)) if name == "books" => {
            if grand.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                grand.to_path_buf()
            }
        }
        _ => parent.to_path_buf(),
    }
}

/// Install the `env_logger` backend. `RUST_LOG` still refines per module.
pub fn init_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Warn,
    };

    let _ = env_logger::Builder::from_default_env()
        .filter_level(filter)
        .format_timestamp_secs()
        .try_init();
}
