//! End-to-end tests for `ComparisonService` over the HTTP page fetcher.
//!
//! Each test stands up a `wiremock` server that plays all four pharmacies
//! from HTML fixtures, with the built-in source registry rebased onto it.

use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medprice_core::{default_sources, OutcomeTag, SourceSpec};
use medprice_scraper::{
    CompareError, ComparisonService, HttpPageFetcher, Orchestrator, OrchestratorSettings,
};

const NETMEDS: &str = include_str!("fixtures/netmeds_search.html");
const ONEMG: &str = include_str!("fixtures/onemg_search.html");
const APOLLO: &str = include_str!("fixtures/apollo_search.html");
const NO_LISTING: &str = include_str!("fixtures/no_listing.html");

const SLUGS: [&str; 4] = ["netmeds", "onemg", "apollo", "pharmeasy"];

/// Built-in sources with every URL pointed at `server`, under a per-source prefix.
fn rebased_sources(server: &MockServer) -> Vec<SourceSpec> {
    let uri = server.uri();
    default_sources()
        .sources
        .into_iter()
        .zip(SLUGS)
        .map(|(mut spec, slug)| {
            spec.query_url_template =
                spec.query_url_template
                    .replacen(&spec.base_url, &format!("{uri}/{slug}"), 1);
            spec.base_url.clone_from(&uri);
            spec
        })
        .collect()
}

fn service(server: &MockServer, timeout: Duration) -> ComparisonService<HttpPageFetcher> {
    let fetcher = HttpPageFetcher::new(5, "medprice-test/0.1", 0, 0);
    let settings = OrchestratorSettings {
        timeout,
        ..OrchestratorSettings::default()
    };
    ComparisonService::new(
        Orchestrator::new(fetcher, settings),
        rebased_sources(server),
        2,
    )
}

async fn mount_page(server: &MockServer, slug: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path_regex(format!("^/{slug}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ---------------------------------------------------------------------------
// Ranking across sources
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ranks_three_found_prices_and_lists_the_miss() {
    let server = MockServer::start().await;
    mount_page(&server, "netmeds", NETMEDS).await;
    mount_page(&server, "onemg", ONEMG).await;
    mount_page(&server, "apollo", APOLLO).await;
    mount_page(&server, "pharmeasy", NO_LISTING).await;

    let report = service(&server, Duration::from_secs(10))
        .compare_medicine("  paracetamol ")
        .await
        .expect("comparison should succeed");

    let ranked: Vec<(&str, Decimal)> = report
        .results
        .iter()
        .map(|r| (r.pharmacy(), r.price()))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Apollo Pharmacy", dec("25.50")),
            ("Netmeds", dec("28.00")),
            ("1mg", dec("30.00")),
        ]
    );
    assert_eq!(report.best_pharmacy, "Apollo Pharmacy");
    assert_eq!(report.best_price, dec("25.50"));
    assert_eq!(report.savings_absolute, Some(dec("4.50")));
    assert_eq!(report.savings_percent, Some(dec("15.0")));
    assert_eq!(report.count, 3);

    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].pharmacy, "PharmEasy");
    assert_eq!(report.missing[0].status, OutcomeTag::NotFound);

    let netmeds = &report.results[1];
    assert_eq!(netmeds.medicine_name(), "Paracetamol 500mg Tablet 10's");
    assert_eq!(
        netmeds.url(),
        format!("{}/prescriptions/paracetamol-500mg-tablet-10-s", server.uri())
    );
}

#[tokio::test]
async fn hyphenates_multi_word_terms_for_netmeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/netmeds/catalogsearch/result/dolo-650/all$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NETMEDS))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "onemg", NO_LISTING).await;
    mount_page(&server, "apollo", NO_LISTING).await;
    mount_page(&server, "pharmeasy", NO_LISTING).await;

    let report = service(&server, Duration::from_secs(10))
        .compare_medicine("dolo 650")
        .await
        .unwrap();

    assert_eq!(report.count, 1);
    assert_eq!(report.best_pharmacy, "Netmeds");
    assert_eq!(report.savings_absolute, None);
    assert_eq!(report.savings_percent, None);
}

// ---------------------------------------------------------------------------
// Timeouts and failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slow_source_is_reported_timed_out_within_the_bound() {
    let server = MockServer::start().await;
    mount_page(&server, "netmeds", NETMEDS).await;
    mount_page(&server, "onemg", ONEMG).await;
    mount_page(&server, "apollo", APOLLO).await;
    Mock::given(method("GET"))
        .and(path_regex("^/pharmeasy/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(APOLLO)
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let started = Instant::now();
    let report = service(&server, Duration::from_secs(1))
        .compare_medicine("paracetamol")
        .await
        .unwrap();

    assert!(
        started.elapsed() < Duration::from_secs(5),
        "comparison took {:?}",
        started.elapsed()
    );
    assert_eq!(report.count, 3);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].pharmacy, "PharmEasy");
    assert_eq!(report.missing[0].status, OutcomeTag::TimedOut);
}

#[tokio::test]
async fn http_errors_become_failed_entries() {
    let server = MockServer::start().await;
    mount_page(&server, "netmeds", NETMEDS).await;
    Mock::given(method("GET"))
        .and(path_regex("^/onemg/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/apollo/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "pharmeasy", NO_LISTING).await;

    let report = service(&server, Duration::from_secs(10))
        .compare_medicine("paracetamol")
        .await
        .unwrap();

    assert_eq!(report.count, 1);
    let statuses: Vec<(&str, OutcomeTag)> = report
        .missing
        .iter()
        .map(|m| (m.pharmacy.as_str(), m.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("1mg", OutcomeTag::Failed),
            ("Apollo Pharmacy", OutcomeTag::Failed),
            ("PharmEasy", OutcomeTag::NotFound),
        ]
    );
    let reason = report.missing[0].reason.as_deref().unwrap_or_default();
    assert!(reason.contains("503"), "reason: {reason}");
    assert!(reason.chars().count() <= 100);
}

// ---------------------------------------------------------------------------
// Error results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn all_sources_missing_is_no_results() {
    let server = MockServer::start().await;
    for slug in SLUGS {
        mount_page(&server, slug, NO_LISTING).await;
    }

    let err = service(&server, Duration::from_secs(10))
        .compare_medicine("xyzzyqq")
        .await
        .unwrap_err();

    assert_eq!(err, CompareError::NoResults { sources: 4 });
}

#[tokio::test]
async fn invalid_terms_are_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(APOLLO))
        .expect(0)
        .mount(&server)
        .await;

    let svc = service(&server, Duration::from_secs(10));
    for input in ["", "   ", "a"] {
        let err = svc.compare_medicine(input).await.unwrap_err();
        assert!(
            matches!(err, CompareError::InvalidInput { .. }),
            "input {input:?} gave {err:?}"
        );
    }
}
