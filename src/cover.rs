//! Placeholder covers for items without artwork.
//!
//! The gradient is picked through an injected RNG so callers decide between
//! variety (`thread_rng`) and reproducibility (a seeded `StdRng`).

use crate::catalog::CatalogItem;
use rand::Rng;

/// Gradient start/end colours.
pub const COVER_PALETTE: [(&str, &str); 5] = [
    ("#667eea", "#764ba2"),
    ("#f093fb", "#f5576c"),
    ("#4facfe", "#00f2fe"),
    ("#43e97b", "#38f9d7"),
    ("#fa709a", "#fee140"),
];

const DEFAULT_LETTER: char = 'P';

/// Uppercased first character of `title`, `P` when empty.
pub fn cover_letter(title: &str) -> String {
    match title.chars().next() {
        Some(first) => first.to_uppercase().collect(),
        None => DEFAULT_LETTER.to_string(),
    }
}

/// SVG cover as a `data:` URI.
pub fn generate_cover<R: Rng + ?Sized>(title: &str, rng: &mut R) -> String {
    let (from, to) = COVER_PALETTE[rng.gen_range(0..COVER_PALETTE.len())];
    let letter = xml_escape(&cover_letter(title));
    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="320">"#,
            r#"<defs><linearGradient id="g" x1="0%" y1="0%" x2="100%" y2="100%">"#,
            r#"<stop offset="0%" style="stop-color:{from}"/>"#,
            r#"<stop offset="100%" style="stop-color:{to}"/>"#,
            r#"</linearGradient></defs>"#,
            r#"<rect width="400" height="320" fill="url(#g)"/>"#,
            r#"<text x="50%" y="50%" text-anchor="middle" dy=".3em" fill="white" "#,
            r#"font-family="system-ui" font-size="120" font-weight="bold" opacity="0.9">{letter}</text>"#,
            r#"</svg>"#
        ),
        from = from,
        to = to,
        letter = letter,
    );
    format!("data:image/svg+xml,{}", urlencoding::encode(&svg))
}

/// The item's own cover, or a generated one.
pub fn cover_source<R: Rng + ?Sized>(item: &CatalogItem, rng: &mut R) -> String {
    match item.cover.as_deref() {
        Some(cover) => cover.to_string(),
        None => generate_cover(&item.title, rng),
    }
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn decoded(uri: &str) -> String {
        let payload = uri.strip_prefix("data:image/svg+xml,").unwrap();
        urlencoding::decode(payload).unwrap().into_owned()
    }

    #[test]
    fn letters_default_and_uppercase() {
        assert_eq!(cover_letter(""), "P");
        assert_eq!(cover_letter("iracema"), "I");
        assert_eq!(cover_letter("ßeta"), "SS");
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = generate_cover("Dom", &mut StdRng::seed_from_u64(7));
        let b = generate_cover("Dom", &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn svg_uses_a_palette_gradient_and_letter() {
        let svg = decoded(&generate_cover("<odd>", &mut StdRng::seed_from_u64(1)));
        assert!(svg.contains(">&lt;</text>"));
        assert!(
            COVER_PALETTE
                .iter()
                .any(|(from, to)| svg.contains(from) && svg.contains(to))
        );
    }

    #[test]
    fn existing_cover_is_kept() {
        let item = CatalogItem {
            cover: Some("covers/dom.jpg".into()),
            ..CatalogItem::default()
        };
        assert_eq!(
            cover_source(&item, &mut StdRng::seed_from_u64(0)),
            "covers/dom.jpg"
        );
    }
}
