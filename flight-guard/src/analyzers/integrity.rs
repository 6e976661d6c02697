//! Referential integrity and structural checks on routes.
//!
//! A single pass classifies every route:
//!
//! - a non-empty source or destination that matches no airport is a
//!   *missing airport* finding, a non-empty airline that matches no airline
//!   is a *missing airline* finding;
//! - any empty reference makes the route *incomplete*, and that field is
//!   never also reported as missing;
//! - every repeat of an earlier (source, destination, airline) triple is a
//!   *duplicate*. Empty references compare equal to each other here, so an
//!   incomplete route can also be a duplicate.
//!
//! A route can produce several findings. Findings are grouped by kind in
//! [`IntegrityKind`] order and sorted by route position within a kind.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{bool_column, count_at, int64_column, optional_str, string_column, Analyzer};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::logging::LogConfig;
use crate::{log_finding, log_query};

const INTEGRITY_SQL: &str = "\
SELECT
    r.route_seq,
    r.source_airport,
    r.destination_airport,
    r.airline,
    (r.source_airport IS NULL OR r.destination_airport IS NULL OR r.airline IS NULL) AS incomplete,
    (r.source_airport IS NOT NULL AND src.code IS NULL) AS missing_source,
    (r.destination_airport IS NOT NULL AND dst.code IS NULL) AS missing_destination,
    (r.airline IS NOT NULL AND al.code IS NULL) AS missing_airline,
    CAST(ROW_NUMBER() OVER (
        PARTITION BY r.source_airport, r.destination_airport, r.airline
        ORDER BY r.route_seq
    ) AS BIGINT) AS occurrence
FROM routes r
LEFT JOIN airports src ON r.source_airport = src.code
LEFT JOIN airports dst ON r.destination_airport = dst.code
LEFT JOIN airlines al ON r.airline = al.code
ORDER BY r.route_seq";

/// Category of an integrity finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrityKind {
    /// The source airport reference resolves to no airport.
    MissingSourceAirport,
    /// The destination airport reference resolves to no airport.
    MissingDestinationAirport,
    /// The airline reference resolves to no airline.
    MissingAirline,
    /// The route repeats an earlier route's triple.
    DuplicateRoute,
    /// At least one of the three references is empty.
    IncompleteRoute,
}

impl IntegrityKind {
    /// All kinds, in report order.
    pub const ALL: [IntegrityKind; 5] = [
        IntegrityKind::MissingSourceAirport,
        IntegrityKind::MissingDestinationAirport,
        IntegrityKind::MissingAirline,
        IntegrityKind::DuplicateRoute,
        IntegrityKind::IncompleteRoute,
    ];

    /// Returns the kebab-case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrityKind::MissingSourceAirport => "missing-source-airport",
            IntegrityKind::MissingDestinationAirport => "missing-destination-airport",
            IntegrityKind::MissingAirline => "missing-airline",
            IntegrityKind::DuplicateRoute => "duplicate-route",
            IntegrityKind::IncompleteRoute => "incomplete-route",
        }
    }
}

impl fmt::Display for IntegrityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural key of a route plus its zero-based input position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey {
    pub source_airport: Option<String>,
    pub destination_airport: Option<String>,
    pub airline: Option<String>,
    pub position: u64,
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "<empty>".to_string());
        write!(
            f,
            "#{} {}->{} ({})",
            self.position,
            show(&self.source_airport),
            show(&self.destination_airport),
            show(&self.airline)
        )
    }
}

/// A single integrity problem found on one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityFinding {
    pub kind: IntegrityKind,
    pub route: RouteKey,
    pub description: String,
}

impl IntegrityFinding {
    fn new(kind: IntegrityKind, route: &RouteKey) -> Self {
        let description = match kind {
            IntegrityKind::MissingSourceAirport => format!(
                "Route {route}: source airport '{}' does not exist",
                route.source_airport.as_deref().unwrap_or_default()
            ),
            IntegrityKind::MissingDestinationAirport => format!(
                "Route {route}: destination airport '{}' does not exist",
                route.destination_airport.as_deref().unwrap_or_default()
            ),
            IntegrityKind::MissingAirline => format!(
                "Route {route}: airline '{}' does not exist",
                route.airline.as_deref().unwrap_or_default()
            ),
            IntegrityKind::DuplicateRoute => {
                format!("Route {route}: duplicates an earlier route with the same triple")
            }
            IntegrityKind::IncompleteRoute => {
                let empty: Vec<&str> = [
                    ("source", &route.source_airport),
                    ("destination", &route.destination_airport),
                    ("airline", &route.airline),
                ]
                .into_iter()
                .filter(|(_, v)| v.is_none())
                .map(|(field, _)| field)
                .collect();
                format!("Route {route}: empty {}", empty.join(", "))
            }
        };
        Self {
            kind,
            route: route.clone(),
            description,
        }
    }
}

/// Checks routes for dangling, duplicate and incomplete references.
#[derive(Debug, Clone, Default)]
pub struct IntegrityAnalyzer {
    log_config: LogConfig,
}

impl IntegrityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the logging verbosity.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }
}

#[async_trait]
impl Analyzer for IntegrityAnalyzer {
    type Output = Vec<IntegrityFinding>;

    #[instrument(skip(self, dataset), fields(analyzer = "integrity"))]
    async fn analyze(&self, dataset: &Dataset) -> Result<Self::Output> {
        log_query!(self.log_config, "integrity", INTEGRITY_SQL);
        let batches = dataset.context().sql(INTEGRITY_SQL).await?.collect().await?;

        // One bucket per kind keeps the output grouped without a re-sort;
        // rows already arrive in route order.
        let mut buckets: [Vec<IntegrityFinding>; 5] = Default::default();
        let mut routes_checked = 0usize;

        for batch in &batches {
            let seq = int64_column(batch, "route_seq")?;
            let sources = string_column(batch, "source_airport")?;
            let destinations = string_column(batch, "destination_airport")?;
            let airlines = string_column(batch, "airline")?;
            let incomplete = bool_column(batch, "incomplete")?;
            let missing_source = bool_column(batch, "missing_source")?;
            let missing_destination = bool_column(batch, "missing_destination")?;
            let missing_airline = bool_column(batch, "missing_airline")?;
            let occurrence = int64_column(batch, "occurrence")?;

            for row in 0..batch.num_rows() {
                routes_checked += 1;
                let route = RouteKey {
                    source_airport: optional_str(sources, row),
                    destination_airport: optional_str(destinations, row),
                    airline: optional_str(airlines, row),
                    position: count_at(seq, row)?,
                };

                let flags = [
                    missing_source.value(row),
                    missing_destination.value(row),
                    missing_airline.value(row),
                    count_at(occurrence, row)? > 1,
                    incomplete.value(row),
                ];
                for (bucket, kind) in IntegrityKind::ALL.iter().enumerate() {
                    if flags[bucket] {
                        let finding = IntegrityFinding::new(*kind, &route);
                        log_finding!(
                            self.log_config,
                            kind = %finding.kind,
                            position = route.position,
                            "Integrity finding"
                        );
                        buckets[bucket].push(finding);
                    }
                }
            }
        }

        let findings: Vec<IntegrityFinding> = buckets.into_iter().flatten().collect();
        debug!(routes_checked, "Integrity scan complete");
        info!(findings = findings.len(), "Integrity analysis finished");
        Ok(findings)
    }

    fn name(&self) -> &str {
        "integrity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Airline, Airport, Route};

    fn dataset(routes: &[Route]) -> Dataset {
        Dataset::from_records(
            &[
                Airport::new("JFK", "Kennedy"),
                Airport::new("LAX", "Los Angeles"),
                Airport::new("ORD", "O'Hare"),
            ],
            &[Airline::new("AA", "American"), Airline::new("UA", "United")],
            routes,
        )
        .unwrap()
    }

    fn kinds(findings: &[IntegrityFinding]) -> Vec<(IntegrityKind, u64)> {
        findings.iter().map(|f| (f.kind, f.route.position)).collect()
    }

    #[tokio::test]
    async fn test_clean_routes_produce_no_findings() {
        let ds = dataset(&[Route::new("JFK", "LAX", "AA"), Route::new("LAX", "ORD", "UA")]);
        let findings = IntegrityAnalyzer::new().analyze(&ds).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_dangling_references() {
        let ds = dataset(&[
            Route::new("XXX", "LAX", "AA"),
            Route::new("JFK", "YYY", "AA"),
            Route::new("JFK", "LAX", "ZZ"),
        ]);
        let findings = IntegrityAnalyzer::new().analyze(&ds).await.unwrap();
        assert_eq!(
            kinds(&findings),
            vec![
                (IntegrityKind::MissingSourceAirport, 0),
                (IntegrityKind::MissingDestinationAirport, 1),
                (IntegrityKind::MissingAirline, 2),
            ]
        );
        assert!(findings[0].description.contains("'XXX'"));
    }

    #[tokio::test]
    async fn test_empty_reference_is_incomplete_not_missing() {
        let ds = dataset(&[
            Route::from_parts(None, Some("LAX"), Some("AA")),
            Route::from_parts(Some("\\N"), Some("QQQ"), Some(" ")),
        ]);
        let findings = IntegrityAnalyzer::new().analyze(&ds).await.unwrap();
        assert_eq!(
            kinds(&findings),
            vec![
                (IntegrityKind::MissingDestinationAirport, 1),
                (IntegrityKind::IncompleteRoute, 0),
                (IntegrityKind::IncompleteRoute, 1),
            ]
        );
        assert_eq!(findings[2].description, "Route #1 <empty>->QQQ (<empty>): empty source, airline");
    }

    #[tokio::test]
    async fn test_duplicates_report_later_occurrences() {
        let ds = dataset(&[
            Route::new("JFK", "LAX", "AA"),
            Route::new("JFK", "LAX", "UA"),
            Route::new("JFK", "LAX", "AA"),
            Route::new("JFK", "LAX", "AA"),
        ]);
        let findings = IntegrityAnalyzer::new().analyze(&ds).await.unwrap();
        assert_eq!(
            kinds(&findings),
            vec![
                (IntegrityKind::DuplicateRoute, 2),
                (IntegrityKind::DuplicateRoute, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_incomplete_duplicates_group_on_empty_values() {
        let ds = dataset(&[
            Route::from_parts(Some("JFK"), Some("LAX"), None),
            Route::from_parts(Some("JFK"), Some("LAX"), Some("")),
        ]);
        let findings = IntegrityAnalyzer::new().analyze(&ds).await.unwrap();
        assert_eq!(
            kinds(&findings),
            vec![
                (IntegrityKind::DuplicateRoute, 1),
                (IntegrityKind::IncompleteRoute, 0),
                (IntegrityKind::IncompleteRoute, 1),
            ]
        );
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&IntegrityKind::MissingDestinationAirport).unwrap();
        assert_eq!(json, "\"missing-destination-airport\"");
        for kind in IntegrityKind::ALL {
            assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{kind}\""));
        }
    }
}
