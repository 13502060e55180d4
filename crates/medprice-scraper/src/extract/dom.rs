//! Small helpers over `scraper`'s element tree.

use scraper::{ElementRef, Html, Selector};

/// Compiles `patterns`, skipping (and logging) any that do not parse.
///
/// Registries are validated at load time, so a failure here means a
/// programmatically built [`medprice_core::SourceSpec`] slipped through.
pub(crate) fn compile(source: &str, patterns: &[String]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|pattern| match Selector::parse(pattern) {
            Ok(selector) => Some(selector),
            Err(err) => {
                tracing::debug!(source, pattern = %pattern, error = ?err, "skipping invalid selector");
                None
            }
        })
        .collect()
}

/// First element in document order matching the highest-priority selector
/// that matches anything.
pub(crate) fn first_in_document<'a>(doc: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|sel| doc.select(sel).next())
}

/// Visible text of `element` with whitespace runs collapsed to one space.
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text among descendants of `scope` matching `selectors`,
/// trying selectors in priority order.
pub(crate) fn first_text_within(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        scope
            .select(sel)
            .map(collapsed_text)
            .find(|text| !text.is_empty())
    })
}

/// `href` of `scope` itself when it is a link, otherwise of its first
/// descendant link.
pub(crate) fn first_href(scope: ElementRef<'_>) -> Option<String> {
    static ANCHOR: std::sync::LazyLock<Selector> =
        std::sync::LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

    let own = (scope.value().name() == "a")
        .then(|| scope.value().attr("href"))
        .flatten();
    own.or_else(|| {
        scope
            .select(&ANCHOR)
            .find_map(|a| a.value().attr("href"))
    })
    .map(str::trim)
    .filter(|href| !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:"))
    .map(str::to_string)
}

/// Resolves `href` against `base_url`; absolute links pass through.
pub(crate) fn resolve_link(base_url: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}
