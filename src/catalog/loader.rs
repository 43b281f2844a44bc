//! Reading `books.json` into catalog items.

use crate::catalog::{CatalogItem, CatalogState};
use crate::notice::Notice;
use crate::size::{calculate_exact_mb, total_bytes};
use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Decode a catalog document.
///
/// Malformed JSON is an error. A well-formed document that is not an array
/// yields no items. Array elements that cannot be read as items are skipped.
pub fn parse_catalog(text: &str) -> Result<Vec<CatalogItem>> {
    let value: Value = serde_json::from_str(text).context("parsing catalog JSON")?;
    let Value::Array(entries) = value else {
        warn!("catalog document is not an array; treating it as empty");
        return Ok(Vec::new());
    };

    let mut items = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            warn!("skipping catalog entry {}: expected an object", idx);
            continue;
        }
        match serde_json::from_value::<CatalogItem>(entry) {
            Ok(item) => items.push(item),
            Err(err) => warn!("skipping catalog entry {}: {}", idx, err),
        }
    }
    Ok(items)
}

/// Read and decode the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    parse_catalog(&data).with_context(|| format!("loading catalog {}", path.display()))
}

impl CatalogState {
    /// Start a session from the catalog at `path`.
    ///
    /// Never fails: an unreadable or malformed catalog becomes an empty
    /// session and an error notice.
    pub fn load(path: &Path) -> (Self, Notice) {
        match load_catalog(path) {
            Ok(items) => {
                let total_mb = calculate_exact_mb(Some(total_bytes(&items)));
                info!(
                    "loaded {} catalog items ({} MB) from {}",
                    items.len(),
                    total_mb,
                    path.display()
                );
                let notice = Notice::catalog_loaded(items.len(), &total_mb);
                (CatalogState::new(items), notice)
            }
            Err(err) => {
                warn!("{err:#}");
                (CatalogState::empty(), Notice::catalog_failed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_array_of_records() {
        let items = parse_catalog(
            r#"[{"title": "A", "size": 10}, {"title": "B", "url": "books/b.epub"}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[1].url.as_deref(), Some("books/b.epub"));
    }

    #[test]
    fn non_array_document_is_empty() {
        assert!(parse_catalog(r#"{"title": "A"}"#).unwrap().is_empty());
        assert!(parse_catalog("42").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_catalog("[{").is_err());
    }

    #[test]
    fn skips_entries_that_are_not_objects() {
        let items = parse_catalog(r#"[1, {"title": "kept"}, "x", null]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "kept");
    }

    #[test]
    fn load_missing_file_degrades_to_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let (state, notice) = CatalogState::load(&dir.path().join("missing.json"));
        assert!(state.items().is_empty());
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[test]
    fn load_reports_count_and_total() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "A", "size": 1500000}}, {{"title": "B", "size": 500000}}]"#
        )
        .unwrap();
        let (state, notice) = CatalogState::load(file.path());
        assert_eq!(state.items().len(), 2);
        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(notice.message.contains("2 books loaded"));
        assert!(notice.message.contains("2.00 MB"));
    }
}
