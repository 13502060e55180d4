//! Aggregation and ranking of per-source outcomes.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::outcome::{FetchOutcome, OutcomeTag, PriceResult};
use crate::CoreError;

/// Ranked view over the sources that produced a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// Ascending by price; ties keep source order.
    pub results: Vec<PriceResult>,
    pub best_price: Decimal,
    pub best_pharmacy: String,
    /// Highest minus lowest price, 2 dp. `None` with a single result.
    pub savings_absolute: Option<Decimal>,
    /// `savings_absolute` as a percentage of the highest price, 1 dp.
    /// `None` with a single result or when the highest price rounds to zero.
    pub savings_percent: Option<Decimal>,
    pub count: usize,
    /// Sources that ended without a price, in source order.
    pub missing: Vec<MissingSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingSource {
    pub pharmacy: String,
    pub status: OutcomeTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Builds a [`ComparisonReport`] from the outcomes of one comparison.
///
/// `outcomes` must be in source priority order; that order breaks price ties.
/// `NotFound`, `TimedOut`, and `Failed` outcomes are all excluded from the
/// ranking and listed under `missing`.
///
/// # Errors
///
/// Returns [`CoreError::NoResults`] when no outcome carries a price.
pub fn aggregate(outcomes: &[FetchOutcome]) -> Result<ComparisonReport, CoreError> {
    let mut results: Vec<PriceResult> = outcomes
        .iter()
        .filter_map(FetchOutcome::as_result)
        .cloned()
        .collect();

    if results.is_empty() {
        return Err(CoreError::NoResults {
            sources: outcomes.len(),
        });
    }

    // `sort_by` is stable, so equal prices keep source order.
    results.sort_by(|a, b| a.price().cmp(&b.price()));

    let best = &results[0];
    let best_price = best.price();
    let best_pharmacy = best.pharmacy().to_string();

    let (savings_absolute, savings_percent) = if results.len() > 1 {
        let lowest = round_dp(best_price, 2);
        let highest = round_dp(results[results.len() - 1].price(), 2);
        let savings = round_dp(highest - lowest, 2);
        let percent = savings
            .checked_div(highest)
            .map(|ratio| round_dp(ratio * Decimal::ONE_HUNDRED, 1));
        (Some(savings), percent)
    } else {
        (None, None)
    };

    let missing = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            FetchOutcome::Found(_) => None,
            FetchOutcome::Failed { source, reason } => Some(MissingSource {
                pharmacy: source.clone(),
                status: OutcomeTag::Failed,
                reason: Some(reason.clone()),
            }),
            other => Some(MissingSource {
                pharmacy: other.source().to_string(),
                status: other.tag(),
                reason: None,
            }),
        })
        .collect();

    Ok(ComparisonReport {
        count: results.len(),
        results,
        best_price,
        best_pharmacy,
        savings_absolute,
        savings_percent,
        missing,
    })
}

fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
