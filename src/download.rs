//! Download planning and execution.
//!
//! A plan is pure: it picks the href, extension, file name and MIME type for
//! an item under the active filter. Execution goes through a `Fetcher`; when
//! the fetch fails the outcome falls back to a direct link instead of an
//! error, so the caller can still hand the user something to open.

use crate::catalog::CatalogItem;
use crate::filename::build_download_name;
use crate::format::{BookFormat, FormatFilter, canonical_format, resolve_download_href};
use crate::notice::Notice;
use crate::size::calculate_exact_mb;
use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadPlan {
    pub title: String,
    pub href: String,
    pub extension: BookFormat,
    pub filename: String,
    pub mime: &'static str,
    pub exact_mb: String,
}

impl DownloadPlan {
    pub fn started_notice(&self) -> Notice {
        Notice::download_started(&self.title, &self.exact_mb)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DownloadOutcome {
    /// Bytes were fetched and written to `path`.
    Saved { path: PathBuf, bytes: u64 },
    /// Fetch failed; the caller should navigate to `href` directly.
    DirectLink {
        href: String,
        filename: String,
        reason: String,
    },
}

impl DownloadOutcome {
    pub fn notice(&self, plan: &DownloadPlan) -> Notice {
        match self {
            DownloadOutcome::Saved { .. } => Notice::download_saved(&plan.title, &plan.exact_mb),
            DownloadOutcome::DirectLink { .. } => {
                Notice::download_direct(&plan.title, &plan.exact_mb)
            }
        }
    }
}

/// Source of file bytes for an href.
pub trait Fetcher {
    fn fetch(&self, href: &str) -> Result<Vec<u8>>;
}

/// Serves hrefs relative to a library root on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map `href` onto a path under the root.
    pub fn resolve(&self, href: &str) -> Result<PathBuf> {
        let trimmed = href.split(['?', '#']).next().unwrap_or("");
        if trimmed.is_empty() {
            bail!("empty href");
        }
        if trimmed.contains("://") || trimmed.starts_with("data:") {
            bail!("href {href} is not served from the library root");
        }
        let decoded = urlencoding::decode(trimmed)
            .with_context(|| format!("decoding href {href}"))?;
        let relative = Path::new(decoded.as_ref());
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => bail!("href {href} escapes the library root"),
            }
        }
        Ok(self.root.join(relative))
    }
}

impl Fetcher for FsFetcher {
    fn fetch(&self, href: &str) -> Result<Vec<u8>> {
        let path = self.resolve(href)?;
        fs::read(&path).with_context(|| format!("reading {}", path.display()))
    }
}

/// Work out what downloading `item` under `filter` means.
pub fn plan_download(item: &CatalogItem, filter: FormatFilter) -> DownloadPlan {
    let href = resolve_download_href(item, filter);
    let extension = filter
        .requested()
        .or_else(|| BookFormat::from_extension(&href))
        .unwrap_or_else(|| canonical_format(item));
    let filename = build_download_name(item, extension.as_str(), &href);
    DownloadPlan {
        title: item.title.clone(),
        href,
        extension,
        filename,
        mime: extension.mime_type(),
        exact_mb: calculate_exact_mb(item.size),
    }
}

/// Fetch the planned file into `dest_dir`.
///
/// Only a failure to write into `dest_dir` is an error; a failed fetch turns
/// into `DownloadOutcome::DirectLink`.
pub fn download(
    plan: &DownloadPlan,
    fetcher: &dyn Fetcher,
    dest_dir: &Path,
) -> Result<DownloadOutcome> {
    let bytes = match fetcher.fetch(&plan.href) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("fetching {} failed, falling back to direct link: {err:#}", plan.href);
            return Ok(DownloadOutcome::DirectLink {
                href: plan.href.clone(),
                filename: plan.filename.clone(),
                reason: format!("{err:#}"),
            });
        }
    };

    fs::create_dir_all(dest_dir)
        .with_context(|| format!("creating download directory {}", dest_dir.display()))?;
    let mut staged = NamedTempFile::new_in(dest_dir)
        .with_context(|| format!("staging download in {}", dest_dir.display()))?;
    staged
        .write_all(&bytes)
        .with_context(|| format!("writing {}", dest_dir.join(&plan.filename).display()))?;

    // Existing files are kept; later copies get a numeric suffix.
    let mut copy = 1;
    let dest = loop {
        let candidate = dest_dir.join(numbered_name(&plan.filename, copy));
        match staged.persist_noclobber(&candidate) {
            Ok(_) => break candidate,
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists && copy < MAX_COPIES => {
                staged = err.file;
                copy += 1;
            }
            Err(err) => {
                return Err(err.error).with_context(|| format!("saving {}", candidate.display()));
            }
        }
    };

    info!("saved {} ({} bytes) to {}", plan.href, bytes.len(), dest.display());
    Ok(DownloadOutcome::Saved {
        path: dest,
        bytes: bytes.len() as u64,
    })
}

const MAX_COPIES: usize = 100;

/// `name` for the first copy, `stem-N.ext` after that.
fn numbered_name(name: &str, copy: usize) -> String {
    if copy <= 1 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{copy}.{ext}"),
        None => format!("{name}-{copy}"),
    }
}

/// Location opened by "preview": the item's primary `url`.
pub fn preview_target(item: &CatalogItem) -> Option<&str> {
    item.url.as_deref()
}
