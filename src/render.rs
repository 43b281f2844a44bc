//! Text and JSON views over a `CatalogState`.
//!
//! This is the presentation edge: it consumes the visible prefix computed by
//! the store and never decides what is visible itself.

use crate::catalog::{CatalogItem, CatalogState, CatalogStats, LONG_DESCRIPTION_THRESHOLD};
use crate::cover::cover_source;
use crate::format::{FormatFilter, canonical_format};
use crate::size::{calculate_exact_mb, format_size};
use anyhow::Result;
use rand::Rng;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    /// 1-based position in the filtered view.
    pub position: usize,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub read_more: bool,
    pub badge: String,
    pub size_label: String,
    pub exact_mb: String,
    pub cover: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub cards: Vec<Card>,
    pub has_more: bool,
    pub empty: bool,
    pub format: String,
    pub query: String,
    pub stats: CatalogStats,
}

/// Whether `description` is long enough to warrant a "read more" action.
pub fn is_long_description(description: &str) -> bool {
    description.chars().count() > LONG_DESCRIPTION_THRESHOLD
}

/// Badge text: the active filter format, or the item's canonical format when
/// browsing all formats.
pub fn badge_for(item: &CatalogItem, filter: FormatFilter) -> String {
    let fmt = filter.requested().unwrap_or_else(|| canonical_format(item));
    fmt.as_str().to_uppercase()
}

pub fn card_for<R: Rng + ?Sized>(
    item: &CatalogItem,
    position: usize,
    filter: FormatFilter,
    rng: &mut R,
) -> Card {
    Card {
        position,
        title: item.title.clone(),
        description: item.description.clone(),
        read_more: is_long_description(item.description_text()),
        badge: badge_for(item, filter),
        size_label: format_size(item.size),
        exact_mb: calculate_exact_mb(item.size),
        cover: cover_source(item, rng),
    }
}

/// Build the visible page and close out the render pass on `state`.
pub fn render_pass<R: Rng + ?Sized>(state: &mut CatalogState, rng: &mut R) -> RenderedPage {
    let filter = state.format();
    let cards: Vec<Card> = state
        .visible()
        .enumerate()
        .map(|(idx, item)| card_for(item, idx + 1, filter, rng))
        .collect();
    let has_more = state.has_more();
    let page = RenderedPage {
        empty: state.filtered_len() == 0,
        cards,
        has_more,
        format: filter.to_string(),
        query: state.query().to_string(),
        stats: state.stats(),
    };
    state.finish_render();
    page
}

/// Plain-text listing, one block per card.
pub fn write_text(page: &RenderedPage, out: &mut impl Write) -> Result<()> {
    if page.empty {
        writeln!(out, "No books found.")?;
    }
    for card in &page.cards {
        writeln!(out, "[{}] {} ({})", card.position, card.title, card.badge)?;
        if let Some(description) = &card.description {
            writeln!(out, "    {}", preview_text(description))?;
            if card.read_more {
                writeln!(out, "    (read more: `read {}`)", card.position)?;
            }
        }
        writeln!(out, "    💾 {}  📄 {}", card.size_label, card.badge)?;
    }
    if page.has_more {
        writeln!(out, "-- Load more: `more` ({} shown) --", page.cards.len())?;
    }
    write_stats(&page.stats, out)
}

pub fn write_stats(stats: &CatalogStats, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "{} of {} books, {} MB total",
        stats.filtered_count, stats.total_count, stats.total_mb
    )?;
    Ok(())
}

// Cards show the first LONG_DESCRIPTION_THRESHOLD characters; the rest is
// behind "read more".
fn preview_text(description: &str) -> String {
    if !is_long_description(description) {
        return description.to_string();
    }
    let mut cut: String = description
        .chars()
        .take(LONG_DESCRIPTION_THRESHOLD)
        .collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::BookFormat;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn books(count: usize) -> Vec<CatalogItem> {
        (0..count)
            .map(|n| CatalogItem {
                title: format!("Book {n}"),
                url: Some(format!("books/epub/book-{n}.epub")),
                size: Some(2_000_000),
                ..CatalogItem::default()
            })
            .collect()
    }

    #[test]
    fn render_pass_follows_load_more_cycle() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = CatalogState::new(books(45));

        let first = render_pass(&mut state, &mut rng);
        assert_eq!(first.cards.len(), 20);
        assert!(first.has_more);

        state.advance_page();
        let second = render_pass(&mut state, &mut rng);
        assert_eq!(second.cards.len(), 40);
        assert!(second.has_more);

        state.advance_page();
        let third = render_pass(&mut state, &mut rng);
        assert_eq!(third.cards.len(), 45);
        assert!(!third.has_more);
        assert_eq!(state.render_index(), 0);
        assert_eq!(third.cards.last().unwrap().position, 45);
    }

    #[test]
    fn badge_tracks_filter() {
        let item = &books(1)[0];
        assert_eq!(badge_for(item, FormatFilter::All), "EPUB");
        assert_eq!(badge_for(item, FormatFilter::Only(BookFormat::Mobi)), "MOBI");
    }

    #[test]
    fn read_more_only_past_threshold() {
        let mut rng = StdRng::seed_from_u64(0);
        let short = CatalogItem {
            description: Some("x".repeat(LONG_DESCRIPTION_THRESHOLD)),
            ..CatalogItem::default()
        };
        let long = CatalogItem {
            description: Some("é".repeat(LONG_DESCRIPTION_THRESHOLD + 1)),
            ..CatalogItem::default()
        };
        assert!(!card_for(&short, 1, FormatFilter::All, &mut rng).read_more);
        assert!(card_for(&long, 1, FormatFilter::All, &mut rng).read_more);
    }

    #[test]
    fn empty_view_renders_notice_and_stats() {
        let mut state = CatalogState::new(books(3));
        state.apply_filter("no such title");
        let page = render_pass(&mut state, &mut StdRng::seed_from_u64(0));
        assert!(page.empty);
        let mut out = Vec::new();
        write_text(&page, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No books found."));
        assert!(text.contains("0 of 3 books, 6.00 MB total"));
    }

    #[test]
    fn text_output_offers_load_more() {
        let mut state = CatalogState::new(books(21));
        let page = render_pass(&mut state, &mut StdRng::seed_from_u64(0));
        let mut out = Vec::new();
        write_text(&page, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[1] Book 0 (EPUB)"));
        assert!(text.contains("💾 2.00 MB"));
        assert!(text.contains("Load more"));
    }
}
