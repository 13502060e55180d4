//! Static per-pharmacy descriptors.
//!
//! A [`SourceSpec`] is pure data: how to build the search URL for a medicine
//! and which CSS patterns the extractor should try, in priority order. One
//! generic extractor runs every source; adding a pharmacy means adding an
//! entry here or in the sources YAML file, not new code.

use std::collections::HashSet;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::search::SearchTerm;
use crate::ConfigError;

/// Placeholder replaced by the encoded search term in a query URL template.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Characters left unescaped inside a query path segment or parameter.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How the search term is spliced into the query URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryEncoding {
    /// Spaces become `%20`.
    #[default]
    PercentEncoded,
    /// Words joined with `-`, as in `/result/paracetamol-500mg/all`.
    Hyphenated,
}

/// Rendering instructions passed to the page fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderHints {
    /// Wait after navigation before reading the page.
    pub settle_ms: u64,
    /// Vertical scroll offset, in pixels, to trigger lazy-loaded listings.
    pub scroll_to: Option<u32>,
    /// Wait after scrolling.
    pub post_scroll_settle_ms: u64,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            settle_ms: 3_000,
            scroll_to: None,
            post_scroll_settle_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Display name, also used as the pharmacy label on results.
    pub id: String,
    /// Origin used to absolutize relative product links.
    pub base_url: String,
    /// Search URL containing [`QUERY_PLACEHOLDER`].
    pub query_url_template: String,
    #[serde(default)]
    pub query_encoding: QueryEncoding,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Pause after this source in sequential mode; overrides the global delay.
    #[serde(default)]
    pub pacing_delay_ms: Option<u64>,
    #[serde(default)]
    pub render: RenderHints,
    /// Product listing containers, most specific first.
    #[serde(default)]
    pub container_selectors: Vec<String>,
    /// Price-bearing elements searched inside a matched container.
    #[serde(default = "default_price_selectors")]
    pub price_selectors: Vec<String>,
    /// Looser product-like patterns whose text is scanned for a price.
    #[serde(default)]
    pub product_selectors: Vec<String>,
    /// Heading- or link-like elements holding the product title.
    #[serde(default = "default_name_selectors")]
    pub name_selectors: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_price_selectors() -> Vec<String> {
    strings(&["span[class*='price']", "[class*='Price']", "[class*='price']"])
}

fn default_name_selectors() -> Vec<String> {
    strings(&["h1", "h2", "h3", "h4", "a"])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl SourceSpec {
    /// Builds the search URL for `term` according to this source's encoding.
    #[must_use]
    pub fn query_url(&self, term: &SearchTerm) -> String {
        let encoded = match self.query_encoding {
            QueryEncoding::PercentEncoded => {
                utf8_percent_encode(term.as_str(), QUERY_ENCODE_SET).to_string()
            }
            QueryEncoding::Hyphenated => term
                .words()
                .map(|w| utf8_percent_encode(w, QUERY_ENCODE_SET).to_string())
                .collect::<Vec<_>>()
                .join("-"),
        };
        self.query_url_template.replace(QUERY_PLACEHOLDER, &encoded)
    }

    fn all_selectors(&self) -> impl Iterator<Item = &String> {
        self.container_selectors
            .iter()
            .chain(&self.price_selectors)
            .chain(&self.product_selectors)
            .chain(&self.name_selectors)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceSpec>,
}

impl SourcesFile {
    /// Sources with `enabled: true`, in file order.
    #[must_use]
    pub fn enabled(&self) -> Vec<SourceSpec> {
        self.sources.iter().filter(|s| s.enabled).cloned().collect()
    }
}

/// Load and validate a sources registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for source in &sources_file.sources {
        if source.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source id must be non-empty".to_string(),
            ));
        }

        if !seen_ids.insert(source.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source id: '{}'",
                source.id
            )));
        }

        if !source.query_url_template.contains(QUERY_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "source '{}' query_url_template must contain {QUERY_PLACEHOLDER}",
                source.id
            )));
        }

        let sample_query = source.query_url_template.replace(QUERY_PLACEHOLDER, "query");
        if !is_absolute_http(&source.base_url) || !is_absolute_http(&sample_query) {
            return Err(ConfigError::Validation(format!(
                "source '{}' base_url and query_url_template must be absolute http(s) URLs",
                source.id
            )));
        }

        for selector in source.all_selectors() {
            if scraper::Selector::parse(selector).is_err() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has invalid CSS selector \"{selector}\"",
                    source.id
                )));
            }
        }
    }

    if !sources_file.sources.iter().any(|s| s.enabled) {
        return Err(ConfigError::Validation(
            "at least one source must be enabled".to_string(),
        ));
    }

    Ok(())
}

fn is_absolute_http(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// The built-in registry: Netmeds, 1mg, Apollo Pharmacy, `PharmEasy`, in
/// that priority order.
#[must_use]
pub fn default_sources() -> SourcesFile {
    SourcesFile {
        sources: vec![
            SourceSpec {
                id: "Netmeds".to_string(),
                base_url: "https://www.netmeds.com".to_string(),
                query_url_template: "https://www.netmeds.com/catalogsearch/result/{query}/all"
                    .to_string(),
                query_encoding: QueryEncoding::Hyphenated,
                enabled: true,
                pacing_delay_ms: None,
                render: RenderHints {
                    settle_ms: 4_000,
                    scroll_to: None,
                    post_scroll_settle_ms: 0,
                },
                container_selectors: strings(&[
                    "div.cat-product",
                    "div.ais-InfiniteHits-item",
                    "div.product-box",
                    "div[data-sku]",
                ]),
                price_selectors: default_price_selectors(),
                product_selectors: strings(&[
                    "div[class*='product']",
                    "div[class*='cat-']",
                    "div[class*='item']",
                ]),
                name_selectors: default_name_selectors(),
            },
            SourceSpec {
                id: "1mg".to_string(),
                base_url: "https://www.1mg.com".to_string(),
                query_url_template: "https://www.1mg.com/search/all?name={query}".to_string(),
                query_encoding: QueryEncoding::PercentEncoded,
                enabled: true,
                pacing_delay_ms: None,
                render: RenderHints {
                    settle_ms: 5_000,
                    scroll_to: Some(800),
                    post_scroll_settle_ms: 2_000,
                },
                container_selectors: strings(&[
                    "div[class*='product']",
                    "div[class*='Product']",
                    "div[class*='card']",
                ]),
                price_selectors: default_price_selectors(),
                product_selectors: strings(&["a[href*='/drugs/']", "a[href*='/otc/']"]),
                name_selectors: default_name_selectors(),
            },
            SourceSpec {
                id: "Apollo Pharmacy".to_string(),
                base_url: "https://www.apollopharmacy.in".to_string(),
                query_url_template: "https://www.apollopharmacy.in/search-medicines/{query}"
                    .to_string(),
                query_encoding: QueryEncoding::PercentEncoded,
                enabled: true,
                pacing_delay_ms: None,
                render: RenderHints {
                    settle_ms: 4_000,
                    scroll_to: None,
                    post_scroll_settle_ms: 0,
                },
                container_selectors: strings(&[
                    "div[class*='ProductCard']",
                    "div[data-qa='product']",
                    "div[class*='product']",
                    "div[class*='medicine']",
                ]),
                price_selectors: default_price_selectors(),
                product_selectors: strings(&["a[href*='/otc/']", "a[href*='/medicine/']"]),
                name_selectors: default_name_selectors(),
            },
            SourceSpec {
                id: "PharmEasy".to_string(),
                base_url: "https://pharmeasy.in".to_string(),
                query_url_template: "https://pharmeasy.in/search/all?name={query}".to_string(),
                query_encoding: QueryEncoding::PercentEncoded,
                enabled: true,
                pacing_delay_ms: None,
                render: RenderHints {
                    settle_ms: 5_000,
                    scroll_to: Some(500),
                    post_scroll_settle_ms: 2_000,
                },
                container_selectors: strings(&[
                    "div[class*='ProductCard']",
                    "div[class*='Search_medicineLists']",
                    "div[class*='product']",
                ]),
                price_selectors: default_price_selectors(),
                product_selectors: strings(&[
                    "a[href*='/online-medicine-order/']",
                    "a[href*='/medicine/']",
                ]),
                name_selectors: default_name_selectors(),
            },
        ],
    }
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
