//! The assembled anomaly report.
//!
//! An [`AnomalyReport`] is built once by the [`ReportAssembler`] and never
//! mutated afterwards; all fields are private and exposed through getters.

pub mod assembler;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use assembler::ReportAssembler;

use crate::analyzers::{
    IntegrityFinding, IntegrityKind, OutlierAnalysis, OutlierDirection, OutlierFinding,
    OutlierStatistics, RankingEntry,
};
use crate::config::AnalysisConfig;
use crate::dataset::DatasetStats;
use crate::error::Result;

/// Number of airlines shown by [`AnomalyReport::top_airlines`] by default.
pub const DEFAULT_TOP_AIRLINES: usize = 10;

/// All findings of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    content: ReportContent,
}

/// Everything in a report except the generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ReportContent {
    config: AnalysisConfig,
    dataset: DatasetStats,
    integrity: Vec<IntegrityFinding>,
    outlier_statistics: OutlierStatistics,
    outliers: Vec<OutlierFinding>,
    ranking: Vec<RankingEntry>,
}

/// Number of findings per anomaly type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySummary {
    /// Integrity findings per kind, keyed by the kebab-case kind name
    pub integrity: BTreeMap<String, usize>,
    pub high_outliers: usize,
    pub low_outliers: usize,
    pub ranked_airlines: usize,
}

impl AnomalySummary {
    /// Total number of integrity findings.
    pub fn integrity_total(&self) -> usize {
        self.integrity.values().sum()
    }

    /// Count for one integrity kind.
    pub fn count(&self, kind: IntegrityKind) -> usize {
        self.integrity.get(kind.as_str()).copied().unwrap_or(0)
    }

    /// Total number of outlier airports.
    pub fn outliers_total(&self) -> usize {
        self.high_outliers + self.low_outliers
    }
}

impl AnomalyReport {
    pub(crate) fn new(
        generated_at: DateTime<Utc>,
        config: AnalysisConfig,
        dataset: DatasetStats,
        integrity: Vec<IntegrityFinding>,
        outliers: OutlierAnalysis,
        ranking: Vec<RankingEntry>,
    ) -> Self {
        Self {
            generated_at,
            content: ReportContent {
                config,
                dataset,
                integrity,
                outlier_statistics: outliers.statistics,
                outliers: outliers.findings,
                ranking,
            },
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Configuration the report was produced with.
    pub fn config(&self) -> &AnalysisConfig {
        &self.content.config
    }

    /// Row counts of the analyzed snapshot.
    pub fn dataset_stats(&self) -> DatasetStats {
        self.content.dataset
    }

    pub fn integrity_findings(&self) -> &[IntegrityFinding] {
        &self.content.integrity
    }

    /// Integrity findings of one kind, in route order.
    pub fn integrity_findings_of(&self, kind: IntegrityKind) -> impl Iterator<Item = &IntegrityFinding> {
        self.content.integrity.iter().filter(move |f| f.kind == kind)
    }

    pub fn outlier_findings(&self) -> &[OutlierFinding] {
        &self.content.outliers
    }

    pub fn outlier_statistics(&self) -> &OutlierStatistics {
        &self.content.outlier_statistics
    }

    pub fn ranking(&self) -> &[RankingEntry] {
        &self.content.ranking
    }

    /// The first `n` ranking entries.
    pub fn top_airlines(&self, n: usize) -> &[RankingEntry] {
        let end = n.min(self.content.ranking.len());
        &self.content.ranking[..end]
    }

    /// Returns `true` when no integrity or outlier finding was produced.
    pub fn is_clean(&self) -> bool {
        self.content.integrity.is_empty() && self.content.outliers.is_empty()
    }

    /// Counts findings per anomaly type.
    pub fn summary(&self) -> AnomalySummary {
        let mut integrity: BTreeMap<String, usize> = IntegrityKind::ALL
            .iter()
            .map(|k| (k.as_str().to_string(), 0))
            .collect();
        for finding in &self.content.integrity {
            *integrity.entry(finding.kind.as_str().to_string()).or_default() += 1;
        }
        let high_outliers = self
            .content
            .outliers
            .iter()
            .filter(|f| f.direction == OutlierDirection::High)
            .count();
        AnomalySummary {
            integrity,
            high_outliers,
            low_outliers: self.content.outliers.len() - high_outliers,
            ranked_airlines: self.content.ranking.len(),
        }
    }

    /// Serializes everything except the generation time.
    ///
    /// Two runs over the same snapshot with the same configuration produce
    /// identical content.
    pub fn content_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.content)?)
    }

    /// Serializes the full report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::RouteKey;

    fn report() -> AnomalyReport {
        let route = RouteKey {
            source_airport: Some("XXX".to_string()),
            destination_airport: Some("LAX".to_string()),
            airline: None,
            position: 3,
        };
        let integrity = vec![
            IntegrityFinding {
                kind: IntegrityKind::MissingSourceAirport,
                route: route.clone(),
                description: "missing".to_string(),
            },
            IntegrityFinding {
                kind: IntegrityKind::IncompleteRoute,
                route,
                description: "incomplete".to_string(),
            },
        ];
        let outliers = OutlierAnalysis {
            statistics: OutlierStatistics {
                airports_analyzed: 10,
                mean: Some(19.0),
                std_dev: Some(27.0),
                multiplier: 2.0,
            },
            findings: vec![OutlierFinding {
                airport_code: "HUB".to_string(),
                route_count: 100,
                mean: 19.0,
                std_dev: 27.0,
                deviation: 3.0,
                direction: OutlierDirection::High,
            }],
        };
        let ranking = (1..=12)
            .map(|i| RankingEntry {
                airline_code: format!("L{i:02}"),
                route_count: 100 - i,
                rank: i,
                tied: false,
            })
            .collect();
        AnomalyReport::new(
            Utc::now(),
            AnalysisConfig::default(),
            DatasetStats::default(),
            integrity,
            outliers,
            ranking,
        )
    }

    #[test]
    fn test_summary_counts() {
        let summary = report().summary();
        assert_eq!(summary.count(IntegrityKind::MissingSourceAirport), 1);
        assert_eq!(summary.count(IntegrityKind::IncompleteRoute), 1);
        assert_eq!(summary.count(IntegrityKind::DuplicateRoute), 0);
        assert_eq!(summary.integrity_total(), 2);
        assert_eq!(summary.high_outliers, 1);
        assert_eq!(summary.outliers_total(), 1);
        assert_eq!(summary.ranked_airlines, 12);
        assert_eq!(summary.integrity.len(), IntegrityKind::ALL.len());
    }

    #[test]
    fn test_top_airlines() {
        let report = report();
        assert_eq!(report.top_airlines(DEFAULT_TOP_AIRLINES).len(), 10);
        assert_eq!(report.top_airlines(50).len(), 12);
        assert_eq!(report.top_airlines(1)[0].airline_code, "L01");
    }

    #[test]
    fn test_content_json_ignores_timestamp() {
        let first = report();
        let mut second = first.clone();
        second.generated_at = first.generated_at + chrono::Duration::seconds(5);
        assert_ne!(first.to_json().unwrap(), second.to_json().unwrap());
        assert_eq!(first.content_json().unwrap(), second.content_json().unwrap());
    }

    #[test]
    fn test_report_json_round_trip() {
        let report = report();
        let parsed: AnomalyReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed, report);
        assert!(!parsed.is_clean());
    }
}
