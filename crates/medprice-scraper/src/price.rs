//! Price normalization from raw currency-formatted text.
//!
//! [`normalize_price`] handles one price-bearing string such as `"₹1,249.00"`.
//! [`currency_prices`] scans free text for currency-prefixed numbers and is
//! what the looser extraction tiers use.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid number regex"));

// The mis-encoded rupee glyph ("â‚¹") shows up when a page declares the
// wrong charset.
static CURRENCY_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₹|â‚¹|&#8377;|\bRs\.?|\bINR)\s*([0-9][0-9,]*(?:\.[0-9]+)?)")
        .expect("valid currency price regex")
});

const CURRENCY_MARKERS: [&str; 4] = ["₹", "&#8377;", "Rs", "INR"];

/// Turns raw price text into a positive decimal.
///
/// Thousands separators and currency markers are removed, then any leading
/// non-digit symbols (mis-encoded glyphs included) are skipped before the
/// first `digits[.digits]` run is parsed.
///
/// Returns `None` when no number is present or the number is not positive.
#[must_use]
pub fn normalize_price(raw: &str) -> Option<Decimal> {
    let mut cleaned = raw.replace(',', "");
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    let cleaned = cleaned
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit());

    let number = NUMBER_RE.find(cleaned)?;
    let value = number.as_str().parse::<Decimal>().ok()?;
    (value > Decimal::ZERO).then_some(value)
}

/// All currency-prefixed prices in `text`, left to right.
pub fn currency_prices(text: &str) -> impl Iterator<Item = Decimal> + '_ {
    CURRENCY_PRICE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(|m| normalize_price(m.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn normalize_strips_rupee_and_separators() {
        assert_eq!(normalize_price("₹1,249.50"), Some(dec("1249.50")));
    }

    #[test]
    fn normalize_handles_rs_prefix() {
        assert_eq!(normalize_price("Rs. 30"), Some(dec("30")));
        assert_eq!(normalize_price("Rs.45.75"), Some(dec("45.75")));
    }

    #[test]
    fn normalize_handles_misencoded_glyph() {
        assert_eq!(normalize_price("â‚¹ 25.50"), Some(dec("25.50")));
    }

    #[test]
    fn normalize_skips_arbitrary_leading_symbols() {
        assert_eq!(normalize_price("MRP: $ 99"), Some(dec("99")));
        assert_eq!(normalize_price("  *** 12.5 only"), Some(dec("12.5")));
    }

    #[test]
    fn normalize_takes_first_number() {
        assert_eq!(normalize_price("₹28.00 ₹35.00"), Some(dec("28.00")));
    }

    #[test]
    fn normalize_returns_none_without_digits() {
        assert_eq!(normalize_price(""), None);
        assert_eq!(normalize_price("Out of stock"), None);
        assert_eq!(normalize_price("₹"), None);
    }

    #[test]
    fn normalize_rejects_zero() {
        assert_eq!(normalize_price("₹0.00"), None);
        assert_eq!(normalize_price("0"), None);
    }

    #[test]
    fn normalize_ignores_minus_sign() {
        // A leading '-' is a non-digit symbol and is skipped like any other.
        assert_eq!(normalize_price("-15"), Some(dec("15")));
    }

    #[test]
    fn currency_prices_finds_all_prefixed_numbers() {
        let text = "Dolo 650 Tablet MRP ₹33.60 ₹30.24 10% off Call 1800 123 4567 Rs 1,200";
        let found: Vec<Decimal> = currency_prices(text).collect();
        assert_eq!(found, vec![dec("33.60"), dec("30.24"), dec("1200")]);
    }

    #[test]
    fn currency_prices_requires_a_currency_marker() {
        assert_eq!(currency_prices("rated 4.5 by 1200 users").count(), 0);
    }

    #[test]
    fn currency_prices_does_not_match_inside_words() {
        // "Rs" glued to a preceding word is not a rupee marker.
        assert_eq!(currency_prices("BrandRs 20").count(), 0);
    }

    #[test]
    fn currency_prices_handles_html_entity_and_inr() {
        let found: Vec<Decimal> = currency_prices("&#8377;45 or INR 50.5").collect();
        assert_eq!(found, vec![dec("45"), dec("50.5")]);
    }
}
