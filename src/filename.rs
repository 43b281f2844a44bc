//! Filesystem-safe download names.
//!
//! Names are built from the most descriptive source available (title, then
//! the file name, then the href) and reduced to letters, digits, `-`, `_` and
//! `.` joined by single hyphens. The result is never empty, never carries
//! a path separator or a reserved character, and fits in one path component.

use crate::catalog::CatalogItem;
use crate::format::{last_segment, strip_book_extension};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const FALLBACK_STEM: &str = "file";

/// Byte budget for the stem, leaving room for the extension within the
/// common 255-byte file name limit.
pub const MAX_STEM_BYTES: usize = 240;

/// Download file name for `item` with extension `ext`.
pub fn build_download_name(item: &CatalogItem, ext: &str, href: &str) -> String {
    let source = name_source(item, href);
    let stem = truncate_stem(&sanitize_stem(strip_book_extension(source)));
    let stem = if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    };
    format!("{stem}.{ext}")
}

fn name_source<'a>(item: &'a CatalogItem, href: &'a str) -> &'a str {
    let title = item.title.trim();
    if !title.is_empty() {
        return title;
    }
    if let Some(filename) = item.filename.as_deref() {
        let segment = last_segment(filename);
        if !segment.is_empty() {
            return segment;
        }
    }
    match last_segment(href) {
        "" => FALLBACK_STEM,
        segment => segment,
    }
}

/// Accent-strip, drop hostile characters and hyphenate.
pub fn sanitize_stem(raw: &str) -> String {
    let spaced: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();

    let mut hyphenated = String::with_capacity(spaced.len());
    for word in spaced.split_whitespace() {
        if !hyphenated.is_empty() {
            hyphenated.push('-');
        }
        hyphenated.push_str(word);
    }

    let mut collapsed = String::with_capacity(hyphenated.len());
    for c in hyphenated.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    let mut cleaned = collapsed.as_str();
    if let Some(stripped) = cleaned.strip_suffix('-') {
        if let Some(artifact) = stripped.strip_suffix('.') {
            cleaned = artifact;
        }
    }
    cleaned.trim_matches('-').to_string()
}

/// Cut `stem` to at most `MAX_STEM_BYTES` on a char boundary, dropping any
/// `-` or `.` left dangling by the cut.
fn truncate_stem(stem: &str) -> String {
    if stem.len() <= MAX_STEM_BYTES {
        return stem.to_string();
    }
    let mut end = MAX_STEM_BYTES;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    stem[..end]
        .trim_end_matches(['-', '.'])
        .to_string()
}

// Letters and digits of any script survive, as do `-`, `_` and `.`.
// Everything else, including `\ / : * ? " < > |` and control characters,
// becomes a word break.
fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.') || c.is_whitespace()
}
