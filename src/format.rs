//! Format resolution for catalog items.
//!
//! Every item has exactly one canonical format, derived through a fixed
//! fallback chain (explicit `format` field, then the extension of the primary
//! href, then PDF). The resolver never fails; odd input degrades to PDF.

use crate::catalog::CatalogItem;
use anyhow::{Result, bail};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    Pdf,
    Epub,
    Mobi,
}

impl BookFormat {
    pub const ALL: [BookFormat; 3] = [BookFormat::Pdf, BookFormat::Epub, BookFormat::Mobi];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "pdf",
            BookFormat::Epub => "epub",
            BookFormat::Mobi => "mobi",
        }
    }

    /// Directory used when guessing a location for this format.
    pub fn directory(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "books/pdf",
            BookFormat::Epub => "books/epub",
            BookFormat::Mobi => "books/mobi",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            BookFormat::Pdf => "application/pdf",
            BookFormat::Epub => "application/epub+zip",
            BookFormat::Mobi => "application/x-mobipocket-ebook",
        }
    }

    /// Case-insensitive parse; `None` for anything unrecognized, including
    /// padded values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "pdf" => Some(BookFormat::Pdf),
            "epub" => Some(BookFormat::Epub),
            "mobi" => Some(BookFormat::Mobi),
            _ => None,
        }
    }

    /// Format named by a trailing `.pdf`/`.epub`/`.mobi` on `href`.
    pub fn from_extension(href: &str) -> Option<Self> {
        BookFormat::ALL.into_iter().find(|fmt| {
            let ext = fmt.as_str();
            href.len() > ext.len()
                && href
                    .get(href.len() - ext.len() - 1..)
                    .is_some_and(|tail| tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(ext))
        })
    }
}

impl fmt::Display for BookFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Active format filter selected by the user.
pub enum FormatFilter {
    #[default]
    All,
    Only(BookFormat),
}

impl FormatFilter {
    /// The concrete format requested, if any.
    pub fn requested(&self) -> Option<BookFormat> {
        match self {
            FormatFilter::All => None,
            FormatFilter::Only(fmt) => Some(*fmt),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatFilter::All => "all",
            FormatFilter::Only(fmt) => fmt.as_str(),
        }
    }
}

impl FromStr for FormatFilter {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(FormatFilter::All);
        }
        match BookFormat::parse(trimmed) {
            Some(fmt) => Ok(FormatFilter::Only(fmt)),
            None => bail!("unknown format '{raw}', expected one of all, pdf, epub, mobi"),
        }
    }
}

impl fmt::Display for FormatFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical format of an item. Pure and total.
pub fn canonical_format(item: &CatalogItem) -> BookFormat {
    if let Some(fmt) = item.format.as_deref().and_then(BookFormat::parse) {
        return fmt;
    }
    match BookFormat::from_extension(item.primary_href()) {
        Some(BookFormat::Epub) => BookFormat::Epub,
        Some(BookFormat::Mobi) => BookFormat::Mobi,
        _ => BookFormat::Pdf,
    }
}

/// Pick the location to download for `item` under the active filter.
///
/// An explicit `files` entry for the requested format wins. Without one, the
/// primary href is used when it already matches; otherwise a location under
/// the format's directory is guessed from the primary file name. The guess is
/// never checked, so callers must cope with it not existing.
pub fn resolve_download_href(item: &CatalogItem, filter: FormatFilter) -> String {
    let requested = filter.requested();
    if let Some(fmt) = requested {
        if let Some(explicit) = item.file_for(fmt.as_str()) {
            return explicit.to_string();
        }
    }

    let base_href = item.primary_href();
    let target = match requested {
        Some(fmt) if fmt != canonical_format(item) => fmt,
        _ => return base_href.to_string(),
    };

    let name = match last_segment(base_href) {
        "" => fallback_name(item),
        segment => segment,
    };
    format!(
        "{}/{}.{}",
        target.directory(),
        strip_book_extension(name),
        target.as_str()
    )
}

/// Whether `item` can be offered in `fmt`.
pub fn item_has_format(item: &CatalogItem, fmt: BookFormat) -> bool {
    if item.file_for(fmt.as_str()).is_some() {
        return true;
    }
    if canonical_format(item) == fmt {
        return true;
    }
    match fmt {
        BookFormat::Epub | BookFormat::Mobi => {
            BookFormat::from_extension(item.primary_href()) == Some(fmt)
        }
        BookFormat::Pdf => false,
    }
}

/// Last `/`-separated segment; empty when `href` ends with a slash.
pub fn last_segment(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or("")
}

/// Drop one trailing `.pdf`, `.epub` or `.mobi`, ignoring case.
pub fn strip_book_extension(name: &str) -> &str {
    match BookFormat::from_extension(name) {
        Some(fmt) => &name[..name.len() - fmt.as_str().len() - 1],
        None => name,
    }
}

fn fallback_name(item: &CatalogItem) -> &str {
    if let Some(filename) = item.filename.as_deref() {
        let segment = last_segment(filename);
        if !segment.is_empty() {
            return segment;
        }
    }
    if !item.title.is_empty() {
        return item.title.as_str();
    }
    "file"
}
