//! Comparison entry point: validate, fetch, aggregate.

use medprice_core::{aggregate, AppConfig, ComparisonReport, SearchTerm, SourceSpec};

use crate::error::CompareError;
use crate::fetch::PageFetcher;
use crate::orchestrator::{Orchestrator, OrchestratorSettings};

pub struct ComparisonService<F> {
    orchestrator: Orchestrator<F>,
    sources: Vec<SourceSpec>,
    min_term_len: usize,
}

impl<F: PageFetcher> ComparisonService<F> {
    #[must_use]
    pub fn new(orchestrator: Orchestrator<F>, sources: Vec<SourceSpec>, min_term_len: usize) -> Self {
        Self {
            orchestrator,
            sources,
            min_term_len,
        }
    }

    /// Wires a service from loaded configuration and the enabled sources.
    #[must_use]
    pub fn from_config(fetcher: F, config: &AppConfig, sources: Vec<SourceSpec>) -> Self {
        let orchestrator = Orchestrator::new(fetcher, OrchestratorSettings::from_config(config));
        Self::new(orchestrator, sources, config.min_term_len)
    }

    /// Compares prices for `raw_name` across every configured source.
    ///
    /// Input is validated before anything is scheduled, so a rejected name
    /// never touches the network.
    ///
    /// # Errors
    ///
    /// - [`CompareError::InvalidInput`] when the name is empty or too short.
    /// - [`CompareError::NoResults`] when no source produced a price.
    pub async fn compare_medicine(&self, raw_name: &str) -> Result<ComparisonReport, CompareError> {
        let term = SearchTerm::parse(raw_name, self.min_term_len).map_err(|err| {
            tracing::warn!(input = %raw_name, error = %err, "rejected search term");
            CompareError::from(err)
        })?;

        let outcomes = self.orchestrator.compare(&term, &self.sources).await;
        let report = aggregate(&outcomes)?;

        tracing::info!(
            term = %term,
            count = report.count,
            best_pharmacy = %report.best_pharmacy,
            best_price = %report.best_price,
            "comparison complete"
        );
        Ok(report)
    }
}
