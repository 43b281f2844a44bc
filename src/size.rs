//! Human-readable byte counts.
//!
//! Sizes use decimal units (1 MB = 1,000,000 bytes). The quotient is an
//! `f64` and rounding follows its exact binary value with ties going up, so
//! `1_250` bytes renders as `1.3 KB` while `1_005_000` bytes (stored just
//! below 1.005) renders as `1.00 MB`.

use crate::catalog::CatalogItem;

/// Label used when an item carries no size (absent or zero).
pub const UNKNOWN_SIZE: &str = "Unknown size";

const BYTES_PER_KB: f64 = 1_000.0;
const BYTES_PER_MB: f64 = 1_000_000.0;

// Quotients here are at least one millionth, so their binary expansions end
// within this many decimal places.
const EXACT_DIGITS: usize = 80;

/// Tiered size label: `"x.xx MB"` from one megabyte up, `"x.x KB"` below.
pub fn format_size(bytes: Option<u64>) -> String {
    let bytes = match bytes {
        Some(b) if b > 0 => b as f64,
        _ => return UNKNOWN_SIZE.to_string(),
    };

    let megabytes = bytes / BYTES_PER_MB;
    if megabytes >= 1.0 {
        format!("{} MB", fixed_decimal(megabytes, 2))
    } else {
        format!("{} KB", fixed_decimal(bytes / BYTES_PER_KB, 1))
    }
}

/// Exact megabyte value with two decimals and no KB fallback.
pub fn calculate_exact_mb(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) if b > 0 => fixed_decimal(b as f64 / BYTES_PER_MB, 2),
        _ => "0.00".to_string(),
    }
}

/// Sum of every item's size; items without a size count as zero.
pub fn total_bytes(items: &[CatalogItem]) -> u64 {
    items
        .iter()
        .map(|item| item.size.unwrap_or(0))
        .fold(0u64, u64::saturating_add)
}

// `value` with `places` decimals. `{:.N}` resolves exact ties to even, so an
// exact tie is nudged one ulp up first.
fn fixed_decimal(value: f64, places: usize) -> String {
    let value = if is_exact_tie(value, places) {
        f64::from_bits(value.to_bits() + 1)
    } else {
        value
    };
    format!("{value:.places$}")
}

fn is_exact_tie(value: f64, places: usize) -> bool {
    let exact = format!("{value:.prec$}", prec = EXACT_DIGITS);
    let fraction = exact.split_once('.').map_or("", |(_, fraction)| fraction);
    match (fraction.get(places..places + 1), fraction.get(places + 1..)) {
        (Some("5"), Some(rest)) => rest.bytes().all(|b| b == b'0'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_mb_handles_missing_and_zero() {
        assert_eq!(calculate_exact_mb(Some(1_000_000)), "1.00");
        assert_eq!(calculate_exact_mb(Some(0)), "0.00");
        assert_eq!(calculate_exact_mb(None), "0.00");
        assert_eq!(calculate_exact_mb(Some(2_500)), "0.00");
        assert_eq!(calculate_exact_mb(Some(12_345_678)), "12.35");
    }

    #[test]
    fn format_size_switches_unit_at_one_decimal_megabyte() {
        let below = format_size(Some(999_999));
        assert!(below.ends_with("KB"), "got {below}");
        assert_eq!(below, "1000.0 KB");

        let at = format_size(Some(1_000_000));
        assert!(at.ends_with("MB"), "got {at}");
        assert_eq!(at, "1.00 MB");
    }

    #[test]
    fn format_size_labels_unknown_sizes() {
        assert_eq!(format_size(None), UNKNOWN_SIZE);
        assert_eq!(format_size(Some(0)), UNKNOWN_SIZE);
    }

    #[test]
    fn format_size_rounds_ties_up() {
        assert_eq!(format_size(Some(1_250)), "1.3 KB");
        assert_eq!(format_size(Some(2_500_000)), "2.50 MB");
        assert_eq!(format_size(Some(1_125_000)), "1.13 MB");
        assert_eq!(calculate_exact_mb(Some(375_000)), "0.38");
    }

    #[test]
    fn rounding_follows_the_stored_binary_value() {
        // 1.005 and 0.15 are stored slightly below their decimal spelling.
        assert_eq!(format_size(Some(1_005_000)), "1.00 MB");
        assert_eq!(calculate_exact_mb(Some(1_005_000)), "1.00");
        assert_eq!(format_size(Some(150)), "0.1 KB");
        // 1.135 is stored slightly above.
        assert_eq!(format_size(Some(1_135_000)), "1.14 MB");
    }

    #[test]
    fn totals_skip_missing_sizes() {
        let items = vec![
            CatalogItem {
                size: Some(1_500_000),
                ..CatalogItem::default()
            },
            CatalogItem::default(),
            CatalogItem {
                size: Some(500_000),
                ..CatalogItem::default()
            },
        ];
        assert_eq!(total_bytes(&items), 2_000_000);
        assert_eq!(calculate_exact_mb(Some(total_bytes(&items))), "2.00");
    }
}
