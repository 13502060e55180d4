//! `compare` and `sources` command handlers.

use std::fmt::{self, Write};

use medprice_core::search::DEFAULT_MIN_TERM_LEN;
use medprice_core::{AppConfig, ComparisonReport, FetcherKind, SearchTerm, SourceSpec, SourcesFile};
use medprice_scraper::{ComparisonService, HttpPageFetcher, PageFetcher};
use rust_decimal::Decimal;

/// Enabled sources from the configured registry file, or the built-in list.
///
/// # Errors
///
/// Returns an error if the registry file cannot be loaded or validated.
pub(crate) fn enabled_sources(config: &AppConfig) -> anyhow::Result<Vec<SourceSpec>> {
    Ok(load_registry(config)?.enabled())
}

fn load_registry(config: &AppConfig) -> anyhow::Result<SourcesFile> {
    Ok(match &config.sources_path {
        Some(path) => medprice_core::load_sources(path)?,
        None => medprice_core::default_sources(),
    })
}

/// Run one comparison and print the report.
///
/// # Errors
///
/// Returns an error for invalid input, when no pharmacy returned a price, or
/// when the configured fetcher is unavailable in this build.
pub(crate) async fn run_compare(config: &AppConfig, medicine: &str, json: bool) -> anyhow::Result<()> {
    let sources = enabled_sources(config)?;

    match config.fetcher {
        FetcherKind::Http => {
            let fetcher = HttpPageFetcher::new(
                config.request_timeout_secs,
                config.user_agent.clone(),
                config.max_retries,
                config.retry_backoff_base_ms,
            );
            compare_with(fetcher, config, sources, medicine, json).await
        }
        #[cfg(feature = "webdriver")]
        FetcherKind::WebDriver => {
            let fetcher = medprice_scraper::WebDriverPageFetcher::new(
                config.webdriver_url.clone(),
                config.user_agent.clone(),
            );
            compare_with(fetcher, config, sources, medicine, json).await
        }
        #[cfg(not(feature = "webdriver"))]
        FetcherKind::WebDriver => anyhow::bail!(
            "MEDPRICE_FETCHER=webdriver requires a build with the `webdriver` feature"
        ),
    }
}

async fn compare_with<F: PageFetcher>(
    fetcher: F,
    config: &AppConfig,
    sources: Vec<SourceSpec>,
    medicine: &str,
    json: bool,
) -> anyhow::Result<()> {
    let service = ComparisonService::from_config(fetcher, config, sources);
    let report = service.compare_medicine(medicine).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut text = String::new();
        write_report(&mut text, medicine.trim(), &report)?;
        print!("{text}");
    }
    Ok(())
}

/// List every registered source, with an example search URL.
///
/// # Errors
///
/// Returns an error if the registry file cannot be loaded or validated.
pub(crate) fn run_sources(config: &AppConfig) -> anyhow::Result<()> {
    let registry = load_registry(config)?;
    // Fixed sample, independent of the configured minimum term length.
    let example = SearchTerm::parse("paracetamol 500mg", DEFAULT_MIN_TERM_LEN)?;
    println!("{:<20}{:<9}EXAMPLE SEARCH URL", "PHARMACY", "ENABLED");
    for spec in &registry.sources {
        let enabled = if spec.enabled { "yes" } else { "no" };
        println!("{:<20}{:<9}{}", spec.id, enabled, spec.query_url(&example));
    }
    Ok(())
}

fn rupees(amount: Decimal) -> String {
    format!("₹{amount:.2}")
}

/// Plain-text rendering of a report: ranked table, savings, and misses.
pub(crate) fn write_report(
    out: &mut impl Write,
    medicine: &str,
    report: &ComparisonReport,
) -> fmt::Result {
    writeln!(
        out,
        "Best price for \"{medicine}\": {} at {}",
        rupees(report.best_price),
        report.best_pharmacy
    )?;
    writeln!(out)?;
    writeln!(out, "{:<4}{:<20}{:<12}{:<44}LINK", "#", "PHARMACY", "PRICE", "PRODUCT")?;
    for (rank, result) in report.results.iter().enumerate() {
        writeln!(
            out,
            "{:<4}{:<20}{:<12}{:<44}{}",
            rank + 1,
            result.pharmacy(),
            rupees(result.price()),
            result.medicine_name(),
            result.url()
        )?;
    }

    if let Some(absolute) = report.savings_absolute {
        writeln!(out)?;
        match report.savings_percent {
            Some(percent) => writeln!(
                out,
                "Save {} ({percent:.1}%) compared with the highest price",
                rupees(absolute)
            )?,
            None => writeln!(out, "Save {} compared with the highest price", rupees(absolute))?,
        }
    }

    if !report.missing.is_empty() {
        writeln!(out)?;
        let missing = report
            .missing
            .iter()
            .map(|m| format!("{} ({})", m.pharmacy, m.status))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "No price from: {missing}")?;
    }

    Ok(())
}
