//! Askama filters for the shop templates.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::Datelike;

/// Longest product description shown on a catalog card, in characters.
pub const EXCERPT_CHARS: usize = 120;

/// Footer year. The input is ignored: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    Ok(chrono::Utc::now().year())
}

/// Order reference shown to customers: `{{ order.id|order_ref }}` gives `#000042`.
#[askama::filter_fn]
pub fn order_ref(id: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("#{:0>6}", id.to_string()))
}

/// Card-sized description: `{{ product.description|excerpt }}`
#[askama::filter_fn]
pub fn excerpt(text: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(shorten(&text.to_string(), EXCERPT_CHARS))
}

/// Cut at a word boundary so the result, ellipsis included, fits `max` chars.
fn shorten(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    let head = cut.rsplit_once(' ').map_or(cut.as_str(), |(head, _)| head);
    format!("{}…", head.trim_end_matches([' ', ',', '.', ';']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(shorten("  Tapis de yoga ", 40), "Tapis de yoga");
    }

    #[test]
    fn test_long_text_breaks_on_a_word() {
        let text = "Casque Bluetooth avec réduction de bruit active, autonomie 30h";
        let short = shorten(text, 30);
        assert_eq!(short, "Casque Bluetooth avec…");
        assert!(short.chars().count() <= 30);
    }

    #[test]
    fn test_single_long_word_is_cut() {
        assert_eq!(shorten(&"a".repeat(10), 5), "aaaa…");
    }
}
