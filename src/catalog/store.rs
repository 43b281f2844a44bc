//! Filter and pagination state for one browsing session.
//!
//! `CatalogState` owns the loaded items and the current filtered view. The
//! view is a list of indices into `items` so refiltering never clones
//! records. `render_index` marks the end of the previously exposed page; one
//! more chunk is always visible beyond it.

use crate::catalog::{CHUNK_SIZE, CatalogItem};
use crate::format::{FormatFilter, item_has_format};
use crate::size::{calculate_exact_mb, total_bytes};
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CatalogState {
    items: Vec<CatalogItem>,
    filtered: Vec<usize>,
    render_index: usize,
    chunk_size: usize,
    format: FormatFilter,
    query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Counters shown alongside the list.
pub struct CatalogStats {
    pub total_count: usize,
    pub filtered_count: usize,
    pub total_bytes: u64,
    pub total_mb: String,
}

impl CatalogState {
    /// Session over `items` with every item visible and no filter applied.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let filtered = (0..items.len()).collect();
        Self {
            items,
            filtered,
            render_index: 0,
            chunk_size: CHUNK_SIZE,
            format: FormatFilter::All,
            query: String::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Override the page size. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Items in the current filtered view, in catalog order.
    pub fn filtered(&self) -> impl Iterator<Item = &CatalogItem> + '_ {
        self.filtered.iter().map(|&idx| &self.items[idx])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn render_index(&self) -> usize {
        self.render_index
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn format(&self) -> FormatFilter {
        self.format
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Recompute the filtered view for `query` under the active format.
    ///
    /// Matching is a case-insensitive substring test against title and
    /// description; an empty query keeps everything. Resets the cursor.
    pub fn apply_filter(&mut self, query: &str) {
        self.query = query.to_string();
        let needle = query.to_lowercase();
        let requested = self.format.requested();

        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                needle.is_empty()
                    || item.title.to_lowercase().contains(&needle)
                    || item.description_text().to_lowercase().contains(&needle)
            })
            .filter(|(_, item)| requested.is_none_or(|fmt| item_has_format(item, fmt)))
            .map(|(idx, _)| idx)
            .collect();
        self.render_index = 0;
        debug!(
            "filter query={:?} format={} matched {}/{}",
            query,
            self.format,
            self.filtered.len(),
            self.items.len()
        );
    }

    /// Switch the format filter and rerun the current query.
    pub fn set_format(&mut self, format: FormatFilter) {
        self.format = format;
        let query = std::mem::take(&mut self.query);
        self.apply_filter(&query);
    }

    /// End of the visible prefix: `min(render_index + chunk_size, filtered)`.
    pub fn visible_end(&self) -> usize {
        self.render_index
            .saturating_add(self.chunk_size)
            .min(self.filtered.len())
    }

    /// Whether a "load more" affordance should be offered.
    pub fn has_more(&self) -> bool {
        self.visible_end() < self.filtered.len()
    }

    /// Items currently exposed, always a prefix of the filtered view.
    pub fn visible(&self) -> impl Iterator<Item = &CatalogItem> + '_ {
        self.filtered[..self.visible_end()]
            .iter()
            .map(|&idx| &self.items[idx])
    }

    /// Expose one more chunk. Returns `false` (and changes nothing) when the
    /// whole filtered view is already visible.
    pub fn advance_page(&mut self) -> bool {
        let previous_end = self.visible_end();
        if previous_end >= self.filtered.len() {
            return false;
        }
        self.render_index = previous_end;
        debug!(
            "advance page: render_index={} of {}",
            self.render_index,
            self.filtered.len()
        );
        true
    }

    /// Close out a render pass: once nothing remains to load the cursor goes
    /// back to zero, ready for the next filter pass.
    pub fn finish_render(&mut self) {
        if !self.has_more() {
            self.render_index = 0;
        }
    }

    pub fn stats(&self) -> CatalogStats {
        let total = total_bytes(&self.items);
        CatalogStats {
            total_count: self.items.len(),
            filtered_count: self.filtered.len(),
            total_bytes: total,
            total_mb: calculate_exact_mb(Some(total)),
        }
    }
}
