use rust_decimal::Decimal;

use super::*;

fn found(pharmacy: &str, cents: i64) -> FetchOutcome {
    FetchOutcome::Found(
        PriceResult::new(
            pharmacy,
            "Paracetamol 500mg Tablet",
            Decimal::new(cents, 2),
            format!("https://example.com/{pharmacy}"),
        )
        .expect("positive price"),
    )
}

fn not_found(pharmacy: &str) -> FetchOutcome {
    FetchOutcome::NotFound {
        source: pharmacy.to_string(),
    }
}

#[test]
fn paracetamol_scenario_ranks_and_computes_savings() {
    let outcomes = vec![
        found("Netmeds", 3000),
        found("1mg", 2550),
        not_found("Apollo Pharmacy"),
        found("PharmEasy", 2800),
    ];

    let report = aggregate(&outcomes).unwrap();

    let order: Vec<(&str, Decimal)> = report
        .results
        .iter()
        .map(|r| (r.pharmacy(), r.price()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("1mg", Decimal::new(2550, 2)),
            ("PharmEasy", Decimal::new(2800, 2)),
            ("Netmeds", Decimal::new(3000, 2)),
        ]
    );
    assert_eq!(report.best_price, Decimal::new(2550, 2));
    assert_eq!(report.best_pharmacy, "1mg");
    assert_eq!(report.savings_absolute, Some(Decimal::new(450, 2)));
    assert_eq!(report.savings_percent, Some(Decimal::new(150, 1)));
    assert_eq!(report.count, 3);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].pharmacy, "Apollo Pharmacy");
    assert_eq!(report.missing[0].status, OutcomeTag::NotFound);
}

#[test]
fn single_result_has_no_savings() {
    let outcomes = vec![not_found("Netmeds"), found("1mg", 1999)];
    let report = aggregate(&outcomes).unwrap();
    assert_eq!(report.count, 1);
    assert_eq!(report.best_pharmacy, "1mg");
    assert!(report.savings_absolute.is_none());
    assert!(report.savings_percent.is_none());
}

#[test]
fn all_misses_yield_no_results_error() {
    let outcomes = vec![
        not_found("Netmeds"),
        not_found("1mg"),
        not_found("Apollo Pharmacy"),
        not_found("PharmEasy"),
    ];
    let err = aggregate(&outcomes).unwrap_err();
    assert_eq!(err, CoreError::NoResults { sources: 4 });
}

#[test]
fn empty_outcome_list_yields_no_results_error() {
    assert!(matches!(
        aggregate(&[]),
        Err(CoreError::NoResults { sources: 0 })
    ));
}

#[test]
fn timed_out_and_failed_are_excluded_but_listed() {
    let outcomes = vec![
        found("Netmeds", 4200),
        FetchOutcome::TimedOut {
            source: "1mg".to_string(),
        },
        FetchOutcome::failed("Apollo Pharmacy", "connection reset"),
        found("PharmEasy", 3900),
    ];
    let report = aggregate(&outcomes).unwrap();
    assert_eq!(report.count, 2);
    let missing: Vec<(&str, OutcomeTag)> = report
        .missing
        .iter()
        .map(|m| (m.pharmacy.as_str(), m.status))
        .collect();
    assert_eq!(
        missing,
        vec![("1mg", OutcomeTag::TimedOut), ("Apollo Pharmacy", OutcomeTag::Failed)]
    );
    assert_eq!(report.missing[1].reason.as_deref(), Some("connection reset"));
}

#[test]
fn equal_prices_keep_source_order() {
    let outcomes = vec![
        found("Netmeds", 5000),
        found("1mg", 4000),
        found("Apollo Pharmacy", 4000),
        found("PharmEasy", 4000),
    ];
    let report = aggregate(&outcomes).unwrap();
    let names: Vec<&str> = report.results.iter().map(PriceResult::pharmacy).collect();
    assert_eq!(names, vec!["1mg", "Apollo Pharmacy", "PharmEasy", "Netmeds"]);
    assert_eq!(report.best_pharmacy, "1mg");
}

#[test]
fn savings_percent_rounds_to_one_decimal_place() {
    // 10.00 vs 30.00 → 20.00 saved, 66.666..% → 66.7
    let outcomes = vec![found("Netmeds", 1000), found("1mg", 3000)];
    let report = aggregate(&outcomes).unwrap();
    assert_eq!(report.savings_absolute, Some(Decimal::new(2000, 2)));
    assert_eq!(report.savings_percent, Some(Decimal::new(667, 1)));
}

#[test]
fn sub_paisa_prices_have_no_savings_percent() {
    let outcomes = vec![
        FetchOutcome::Found(
            PriceResult::new("Netmeds", "Sample", Decimal::new(3, 3), "https://example.com/a").unwrap(),
        ),
        FetchOutcome::Found(
            PriceResult::new("1mg", "Sample", Decimal::new(4, 3), "https://example.com/b").unwrap(),
        ),
    ];

    let report = aggregate(&outcomes).unwrap();

    assert_eq!(report.best_pharmacy, "Netmeds");
    assert_eq!(report.savings_absolute, Some(Decimal::ZERO));
    assert_eq!(report.savings_percent, None);
}

#[test]
fn results_are_sorted_and_savings_match_extremes() {
    let price_sets: [&[i64]; 4] = [
        &[999, 100, 5000, 2500],
        &[1234, 1234],
        &[45_000, 12, 77_777],
        &[300, 299, 301, 298],
    ];
    for prices in price_sets {
        let outcomes: Vec<FetchOutcome> = prices
            .iter()
            .enumerate()
            .map(|(i, cents)| found(&format!("source-{i}"), *cents))
            .collect();
        let report = aggregate(&outcomes).unwrap();

        assert!(report
            .results
            .windows(2)
            .all(|w| w[0].price() <= w[1].price()));
        assert_eq!(report.best_price, report.results[0].price());

        let max = Decimal::new(*prices.iter().max().unwrap(), 2);
        let min = Decimal::new(*prices.iter().min().unwrap(), 2);
        let expected_abs = (max - min).round_dp(2);
        assert_eq!(report.savings_absolute, Some(expected_abs));
        let expected_pct = round_dp(expected_abs / max * Decimal::ONE_HUNDRED, 1);
        assert_eq!(report.savings_percent, Some(expected_pct));
    }
}

#[test]
fn aggregate_is_deterministic() {
    let outcomes = vec![
        found("Netmeds", 3000),
        found("1mg", 3000),
        not_found("Apollo Pharmacy"),
        found("PharmEasy", 2800),
    ];
    let first = aggregate(&outcomes).unwrap();
    for _ in 0..10 {
        assert_eq!(aggregate(&outcomes).unwrap(), first);
    }
}

#[test]
fn report_serializes_prices_as_strings() {
    let outcomes = vec![found("Netmeds", 3000), found("1mg", 2550)];
    let report = aggregate(&outcomes).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["best_pharmacy"], "1mg");
    assert_eq!(json["best_price"], "25.50");
    assert_eq!(json["results"][0]["pharmacy"], "1mg");
    assert_eq!(json["missing"], serde_json::json!([]));
}
