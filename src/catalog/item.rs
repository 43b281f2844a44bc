//! Catalog record shape.
//!
//! Records come from hand-maintained JSON, so decoding is lenient: missing or
//! oddly typed optional fields degrade to "absent" instead of rejecting the
//! whole record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
/// One book entry as listed in `books.json`. Read-only once loaded.
pub struct CatalogItem {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "byte_count")]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub filename: Option<String>,
    /// Explicit per-format download locations keyed by lowercase format name.
    #[serde(
        default,
        deserialize_with = "file_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub files: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub cover: Option<String>,
}

impl CatalogItem {
    /// Primary file location: `url`, falling back to `filename`, else `""`.
    pub fn primary_href(&self) -> &str {
        self.url
            .as_deref()
            .or(self.filename.as_deref())
            .unwrap_or("")
    }

    /// Explicit download location for `format`, if the record lists one.
    pub fn file_for(&self, format: &str) -> Option<&str> {
        self.files.get(format).map(String::as_str)
    }

    /// Description text, empty when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn byte_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

fn file_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut files = BTreeMap::new();
    if let Value::Object(map) = value {
        for (format, location) in map {
            if let Value::String(location) = location {
                if !location.is_empty() {
                    files.insert(format.to_lowercase(), location);
                }
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_record() {
        let item: CatalogItem = serde_json::from_value(json!({
            "title": "Dom Casmurro",
            "description": "Bentinho and Capitu",
            "size": 2_500_000,
            "format": "EPUB",
            "url": "books/epub/dom-casmurro.epub",
            "files": {"PDF": "books/pdf/dom-casmurro.pdf", "mobi": ""},
            "cover": "covers/dom.jpg"
        }))
        .unwrap();
        assert_eq!(item.title, "Dom Casmurro");
        assert_eq!(item.size, Some(2_500_000));
        assert_eq!(item.format.as_deref(), Some("EPUB"));
        assert_eq!(item.file_for("pdf"), Some("books/pdf/dom-casmurro.pdf"));
        assert_eq!(item.file_for("mobi"), None);
    }

    #[test]
    fn tolerates_odd_field_types() {
        let item: CatalogItem = serde_json::from_value(json!({
            "title": null,
            "description": "",
            "size": "1234",
            "url": 42,
            "files": ["not", "a", "map"]
        }))
        .unwrap();
        assert_eq!(item.title, "");
        assert_eq!(item.description, None);
        assert_eq!(item.size, Some(1234));
        assert_eq!(item.url, None);
        assert!(item.files.is_empty());
    }

    #[test]
    fn negative_and_fractional_sizes() {
        let negative: CatalogItem = serde_json::from_value(json!({"size": -5})).unwrap();
        assert_eq!(negative.size, None);
        let fractional: CatalogItem = serde_json::from_value(json!({"size": 1500.7})).unwrap();
        assert_eq!(fractional.size, Some(1500));
    }

    #[test]
    fn primary_href_prefers_url() {
        let item = CatalogItem {
            url: Some("a.pdf".into()),
            filename: Some("b.pdf".into()),
            ..CatalogItem::default()
        };
        assert_eq!(item.primary_href(), "a.pdf");
        let item = CatalogItem {
            filename: Some("b.pdf".into()),
            ..CatalogItem::default()
        };
        assert_eq!(item.primary_href(), "b.pdf");
        assert_eq!(CatalogItem::default().primary_href(), "");
    }
}
