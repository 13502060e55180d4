//! Generic source extractor.
//!
//! Every pharmacy runs through the same code; what differs is the
//! [`SourceSpec`] data. Extraction walks an ordered list of strategy tiers
//! and stops at the first that produces a price inside the sanity window:
//!
//! 1. [`ExtractionTier::Structured`]: first listing container, then a
//!    price-bearing element inside it (or a currency scan of its text).
//! 2. [`ExtractionTier::ScopedText`]: first looser product-like element,
//!    currency scan of its text.
//! 3. [`ExtractionTier::WholePage`]: currency scan of the whole page.
//!
//! Name and link come from whichever element the winning tier matched; the
//! whole-page tier has none and falls back to the search term and query URL.
//! A miss at every tier is `None`, never an error.

mod dom;

use medprice_core::{PriceResult, PriceWindow, SearchTerm, SourceSpec};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::fetch::PageContent;
use crate::price::{currency_prices, normalize_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTier {
    Structured,
    ScopedText,
    WholePage,
}

impl std::fmt::Display for ExtractionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionTier::Structured => write!(f, "structured"),
            ExtractionTier::ScopedText => write!(f, "scoped_text"),
            ExtractionTier::WholePage => write!(f, "whole_page"),
        }
    }
}

struct Candidate<'a> {
    price: Decimal,
    /// Element the price was found in; `None` for the whole-page tier.
    scope: Option<ElementRef<'a>>,
}

struct CompiledSpec {
    containers: Vec<Selector>,
    prices: Vec<Selector>,
    products: Vec<Selector>,
    names: Vec<Selector>,
}

impl CompiledSpec {
    fn new(spec: &SourceSpec) -> Self {
        Self {
            containers: dom::compile(&spec.id, &spec.container_selectors),
            prices: dom::compile(&spec.id, &spec.price_selectors),
            products: dom::compile(&spec.id, &spec.product_selectors),
            names: dom::compile(&spec.id, &spec.name_selectors),
        }
    }
}

type Strategy = for<'a> fn(&'a Html, &CompiledSpec, &PriceWindow) -> Option<Candidate<'a>>;

const STRATEGIES: [(ExtractionTier, Strategy); 3] = [
    (ExtractionTier::Structured, structured_lookup),
    (ExtractionTier::ScopedText, scoped_text_scan),
    (ExtractionTier::WholePage, whole_page_scan),
];

/// Extracts a [`PriceResult`] for `spec` from a fetched page.
///
/// Returns `None` when no tier yields an acceptable price.
#[must_use]
pub fn extract(
    page: &PageContent,
    term: &SearchTerm,
    spec: &SourceSpec,
    window: &PriceWindow,
) -> Option<PriceResult> {
    extract_with_tier(page, term, spec, window).map(|(result, _)| result)
}

/// Like [`extract`], also reporting which tier matched.
#[must_use]
pub fn extract_with_tier(
    page: &PageContent,
    term: &SearchTerm,
    spec: &SourceSpec,
    window: &PriceWindow,
) -> Option<(PriceResult, ExtractionTier)> {
    let doc = Html::parse_document(&page.html);
    let compiled = CompiledSpec::new(spec);

    for (tier, strategy) in STRATEGIES {
        let Some(candidate) = strategy(&doc, &compiled, window) else {
            tracing::debug!(source = %spec.id, %tier, "extraction tier missed");
            continue;
        };

        let name = candidate
            .scope
            .and_then(|scope| dom::first_text_within(scope, &compiled.names))
            .unwrap_or_else(|| term.as_str().to_string());

        let url = candidate
            .scope
            .and_then(dom::first_href)
            .and_then(|href| dom::resolve_link(&spec.base_url, &href))
            .unwrap_or_else(|| page.url.clone());

        tracing::debug!(source = %spec.id, %tier, price = %candidate.price, "extraction tier matched");
        return PriceResult::new(spec.id.clone(), &name, candidate.price, url)
            .map(|result| (result, tier));
    }

    None
}

/// Tier 1: first listing container, then a price element inside it.
fn structured_lookup<'a>(
    doc: &'a Html,
    compiled: &CompiledSpec,
    window: &PriceWindow,
) -> Option<Candidate<'a>> {
    let container = dom::first_in_document(doc, &compiled.containers)?;

    let from_price_element = compiled.prices.iter().find_map(|sel| {
        container
            .select(sel)
            .filter_map(|el| normalize_price(&dom::collapsed_text(el)))
            .find(|p| window.contains(*p))
    });

    let price = from_price_element.or_else(|| {
        currency_prices(&dom::collapsed_text(container)).find(|p| window.contains(*p))
    })?;

    Some(Candidate {
        price,
        scope: Some(container),
    })
}

/// Tier 2: text of the first product-like element, scanned for a price.
fn scoped_text_scan<'a>(
    doc: &'a Html,
    compiled: &CompiledSpec,
    window: &PriceWindow,
) -> Option<Candidate<'a>> {
    let element = dom::first_in_document(doc, &compiled.products)?;
    let price = currency_prices(&dom::collapsed_text(element)).find(|p| window.contains(*p))?;
    Some(Candidate {
        price,
        scope: Some(element),
    })
}

/// Tier 3: every currency-prefixed number on the page, first inside the window.
fn whole_page_scan<'a>(
    doc: &'a Html,
    _compiled: &CompiledSpec,
    window: &PriceWindow,
) -> Option<Candidate<'a>> {
    let text = visible_text(doc);
    let price = currency_prices(&text).find(|p| window.contains(*p))?;
    Some(Candidate { price, scope: None })
}

/// Page text excluding `script`, `style`, and `noscript` contents.
fn visible_text(doc: &Html) -> String {
    doc.root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent()?;
            let hidden = parent
                .value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
            (!hidden).then_some(&**text)
        })
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
