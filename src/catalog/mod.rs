//! Book catalog wiring.
//!
//! This module wraps the static catalog document (by default
//! `books/books.json` under the library root) so front ends can load it once,
//! then search, filter by format and page through the result. Items are
//! immutable after load; all session state lives in `CatalogState`.

pub mod debounce;
pub mod item;
pub mod loader;
pub mod store;

use std::time::Duration;

pub use debounce::Debouncer;
pub use item::CatalogItem;
pub use loader::{load_catalog, parse_catalog};
pub use store::{CatalogState, CatalogStats};

/// Default catalog location relative to the library root.
pub const DEFAULT_CATALOG_PATH: &str = "books/books.json";

/// Items exposed per "load more" step.
pub const CHUNK_SIZE: usize = 20;

/// Quiet period before a typed search is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Descriptions longer than this many characters get a "read more" action.
pub const LONG_DESCRIPTION_THRESHOLD: usize = 180;
