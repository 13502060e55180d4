//! Per-source results of one comparison request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum display length, in characters, of a medicine name.
pub const MAX_NAME_CHARS: usize = 80;

/// Maximum length, in characters, of a `Failed` reason.
pub const MAX_REASON_CHARS: usize = 100;

/// A successfully extracted price from one pharmacy.
///
/// Only constructible through [`PriceResult::new`], which refuses
/// non-positive prices, so an invalid result never exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceResult {
    pharmacy: String,
    medicine_name: String,
    price: Decimal,
    url: String,
}

impl PriceResult {
    /// Returns `None` when `price` is zero or negative. The name is trimmed
    /// and cut to [`MAX_NAME_CHARS`] characters.
    #[must_use]
    pub fn new(
        pharmacy: impl Into<String>,
        medicine_name: &str,
        price: Decimal,
        url: impl Into<String>,
    ) -> Option<Self> {
        if price <= Decimal::ZERO {
            return None;
        }
        Some(Self {
            pharmacy: pharmacy.into(),
            medicine_name: truncate_chars(medicine_name.trim(), MAX_NAME_CHARS),
            price,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn pharmacy(&self) -> &str {
        &self.pharmacy
    }

    #[must_use]
    pub fn medicine_name(&self) -> &str {
        &self.medicine_name
    }

    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What happened to one source during a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(PriceResult),
    /// The page was fetched but no extraction tier yielded a price.
    NotFound { source: String },
    /// The source did not settle before the global timeout bound.
    TimedOut { source: String },
    /// Session, network, or task failure.
    Failed { source: String, reason: String },
}

impl FetchOutcome {
    /// Builds a `Failed` outcome, shortening the reason.
    #[must_use]
    pub fn failed(source: impl Into<String>, reason: &str) -> Self {
        FetchOutcome::Failed {
            source: source.into(),
            reason: truncate_chars(reason, MAX_REASON_CHARS),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            FetchOutcome::Found(result) => result.pharmacy(),
            FetchOutcome::NotFound { source }
            | FetchOutcome::TimedOut { source }
            | FetchOutcome::Failed { source, .. } => source,
        }
    }

    #[must_use]
    pub fn tag(&self) -> OutcomeTag {
        match self {
            FetchOutcome::Found(_) => OutcomeTag::Found,
            FetchOutcome::NotFound { .. } => OutcomeTag::NotFound,
            FetchOutcome::TimedOut { .. } => OutcomeTag::TimedOut,
            FetchOutcome::Failed { .. } => OutcomeTag::Failed,
        }
    }

    #[must_use]
    pub fn as_result(&self) -> Option<&PriceResult> {
        match self {
            FetchOutcome::Found(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTag {
    Found,
    NotFound,
    TimedOut,
    Failed,
}

impl std::fmt::Display for OutcomeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeTag::Found => write!(f, "found"),
            OutcomeTag::NotFound => write!(f, "not_found"),
            OutcomeTag::TimedOut => write!(f, "timed_out"),
            OutcomeTag::Failed => write!(f, "failed"),
        }
    }
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_and_negative_prices() {
        assert!(PriceResult::new("1mg", "x", Decimal::ZERO, "https://a").is_none());
        assert!(PriceResult::new("1mg", "x", Decimal::new(-5, 0), "https://a").is_none());
    }

    #[test]
    fn new_truncates_long_names_on_char_boundary() {
        let long = "₹".repeat(100);
        let result = PriceResult::new("1mg", &long, Decimal::ONE, "https://a").unwrap();
        assert_eq!(result.medicine_name().chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn failed_reason_is_shortened() {
        let outcome = FetchOutcome::failed("Netmeds", &"e".repeat(500));
        match outcome {
            FetchOutcome::Failed { reason, .. } => assert_eq!(reason.len(), MAX_REASON_CHARS),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn source_is_reported_for_every_variant() {
        let found = FetchOutcome::Found(
            PriceResult::new("1mg", "Dolo 650", Decimal::new(3050, 2), "https://www.1mg.com")
                .unwrap(),
        );
        assert_eq!(found.source(), "1mg");
        assert_eq!(found.tag(), OutcomeTag::Found);
        let timed_out = FetchOutcome::TimedOut {
            source: "PharmEasy".to_string(),
        };
        assert_eq!(timed_out.source(), "PharmEasy");
        assert_eq!(timed_out.tag().to_string(), "timed_out");
    }
}
