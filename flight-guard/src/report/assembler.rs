//! Combines analyzer outputs into a report.

use chrono::Utc;
use tracing::{error, info};

use super::AnomalyReport;
use crate::analyzers::{IntegrityFinding, OutlierAnalysis, RankingEntry};
use crate::config::AnalysisConfig;
use crate::dataset::DatasetStats;
use crate::error::{GuardError, Result};

/// Merges the outputs of the three analyzers.
///
/// Assembly is all-or-nothing: if any analyzer failed, no report is built
/// and the first failure (in integrity, outliers, ranking order) is
/// returned wrapped in [`GuardError::AnalyzerFailed`]. Errors that already
/// name their analyzer keep that name.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    config: AnalysisConfig,
    dataset: DatasetStats,
}

impl ReportAssembler {
    pub fn new(config: AnalysisConfig, dataset: DatasetStats) -> Self {
        Self { config, dataset }
    }

    pub fn assemble(
        self,
        integrity: Result<Vec<IntegrityFinding>>,
        outliers: Result<OutlierAnalysis>,
        ranking: Result<Vec<RankingEntry>>,
    ) -> Result<AnomalyReport> {
        let integrity = integrity.map_err(|e| failed("integrity", e))?;
        let outliers = outliers.map_err(|e| failed("outliers", e))?;
        let ranking = ranking.map_err(|e| failed("ranking", e))?;

        let report = AnomalyReport::new(
            Utc::now(),
            self.config,
            self.dataset,
            integrity,
            outliers,
            ranking,
        );
        info!(
            integrity = report.integrity_findings().len(),
            outliers = report.outlier_findings().len(),
            ranked = report.ranking().len(),
            "Anomaly report assembled"
        );
        Ok(report)
    }
}

/// Labels an analyzer error with the analyzer that raised it.
///
/// Already-labelled errors and cancellation pass through unchanged.
pub(crate) fn failed(analyzer: &str, source: GuardError) -> GuardError {
    match source {
        GuardError::AnalyzerFailed { .. } | GuardError::Cancelled => source,
        other => {
            error!(analyzer, error = %other, "Analyzer failed, discarding partial results");
            GuardError::analyzer_failed(analyzer, other)
        }
    }
}
