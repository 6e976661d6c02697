//! Integration tests for the integrity analyzer on the sample network.

use flight_guard::analyzers::{Analyzer, IntegrityAnalyzer, IntegrityKind};
use flight_guard::dataset::Dataset;
use flight_guard::model::{Airline, Airport, Route};
use flight_guard::test_fixtures::{anomalous_dataset, clean_dataset, sample_routes};

#[tokio::test]
async fn test_sample_network_findings() {
    let dataset = anomalous_dataset().unwrap();
    let findings = IntegrityAnalyzer::new().analyze(&dataset).await.unwrap();

    let got: Vec<(IntegrityKind, u64)> = findings
        .iter()
        .map(|f| (f.kind, f.route.position))
        .collect();
    assert_eq!(
        got,
        vec![
            (IntegrityKind::MissingSourceAirport, 7),
            (IntegrityKind::MissingDestinationAirport, 8),
            (IntegrityKind::MissingAirline, 9),
            (IntegrityKind::DuplicateRoute, 6),
            (IntegrityKind::IncompleteRoute, 10),
            (IntegrityKind::IncompleteRoute, 11),
            (IntegrityKind::IncompleteRoute, 12),
        ]
    );
}

#[tokio::test]
async fn test_clean_network_has_no_findings() {
    let dataset = clean_dataset().unwrap();
    let findings = IntegrityAnalyzer::new().analyze(&dataset).await.unwrap();
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[tokio::test]
async fn test_every_incomplete_route_is_reported_once() {
    let dataset = anomalous_dataset().unwrap();
    let findings = IntegrityAnalyzer::new().analyze(&dataset).await.unwrap();

    for (position, route) in sample_routes().iter().enumerate() {
        let incomplete = findings
            .iter()
            .filter(|f| f.kind == IntegrityKind::IncompleteRoute && f.route.position == position as u64)
            .count();
        assert_eq!(incomplete, usize::from(!route.is_complete()), "route {position}");
    }
}

#[tokio::test]
async fn test_empty_source_never_missing_even_when_shared() {
    // Two routes with an empty source; the empty value must not be treated as
    // an unknown airport code.
    let dataset = Dataset::from_records(
        &[Airport::new("LAX", "Los Angeles")],
        &[Airline::new("AA", "American")],
        &[
            Route::from_parts(Some(""), Some("LAX"), Some("AA")),
            Route::from_parts(None, Some("LAX"), Some("UA")),
        ],
    )
    .unwrap();

    let findings = IntegrityAnalyzer::new().analyze(&dataset).await.unwrap();
    assert!(findings
        .iter()
        .all(|f| f.kind != IntegrityKind::MissingSourceAirport));
    assert_eq!(
        findings
            .iter()
            .filter(|f| f.kind == IntegrityKind::IncompleteRoute)
            .count(),
        2
    );
    // The unknown airline on the second route is still reported.
    assert!(findings
        .iter()
        .any(|f| f.kind == IntegrityKind::MissingAirline && f.route.position == 1));
}

#[tokio::test]
async fn test_duplicate_detection_references_second_occurrence() {
    let dataset = Dataset::from_records(
        &[Airport::new("A", "Alpha"), Airport::new("B", "Bravo")],
        &[Airline::new("C", "Charlie"), Airline::new("D", "Delta")],
        &[
            Route::new("A", "B", "C"),
            Route::new("A", "B", "C"),
            Route::new("A", "B", "D"),
        ],
    )
    .unwrap();

    let findings = IntegrityAnalyzer::new().analyze(&dataset).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, IntegrityKind::DuplicateRoute);
    assert_eq!(findings[0].route.position, 1);
    assert_eq!(findings[0].route.airline.as_deref(), Some("C"));
}

#[tokio::test]
async fn test_references_are_case_sensitive() {
    let dataset = Dataset::from_records(
        &[Airport::new("JFK", "Kennedy"), Airport::new("LAX", "Los Angeles")],
        &[Airline::new("AA", "American")],
        &[Route::new("jfk", "LAX", "AA")],
    )
    .unwrap();

    let findings = IntegrityAnalyzer::new().analyze(&dataset).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, IntegrityKind::MissingSourceAirport);
}

#[tokio::test]
async fn test_padded_references_resolve_after_trimming() {
    let dataset = Dataset::from_records(
        &[Airport::new("JFK", "Kennedy"), Airport::new("LAX", "Los Angeles")],
        &[Airline::new("AA", "American")],
        &[
            Route::new(" JFK", "LAX ", " AA "),
            Route::new("jfk ", "LAX", "AA"),
        ],
    )
    .unwrap();

    let findings = IntegrityAnalyzer::new().analyze(&dataset).await.unwrap();
    let found: Vec<(IntegrityKind, u64)> = findings
        .iter()
        .map(|f| (f.kind, f.route.position))
        .collect();
    assert_eq!(found, vec![(IntegrityKind::MissingSourceAirport, 1)]);
    assert_eq!(findings[0].route.source_airport.as_deref(), Some("jfk"));
}
