//! Orchestration of one analysis run.
//!
//! [`AnomalyEngine`] validates its configuration up front, runs the three
//! analyzers concurrently on one dataset snapshot, waits for all of them and
//! hands their outputs to the [`ReportAssembler`]. The snapshot is shared
//! read-only; analyzers never observe each other.

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::analyzers::{Analyzer, IntegrityAnalyzer, OutlierAnalyzer, RankingAnalyzer};
use crate::cancellation::CancellationToken;
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::{GuardError, Result};
use crate::logging::LogConfig;
use crate::report::assembler::failed;
use crate::report::{AnomalyReport, ReportAssembler};

/// Runs the integrity, outlier and ranking analyzers and assembles a report.
///
/// # Examples
///
/// ```rust
/// use flight_guard::config::AnalysisConfig;
/// use flight_guard::dataset::Dataset;
/// use flight_guard::engine::AnomalyEngine;
/// use flight_guard::model::{Airline, Airport, Route};
///
/// # #[tokio::main]
/// # async fn main() -> flight_guard::error::Result<()> {
/// let dataset = Dataset::from_records(
///     &[Airport::new("JFK", "Kennedy"), Airport::new("LAX", "Los Angeles")],
///     &[Airline::new("AA", "American")],
///     &[Route::new("JFK", "LAX", "AA"), Route::new("JFK", "SFO", "AA")],
/// )?;
///
/// let report = AnomalyEngine::new(AnalysisConfig::default())?.run(&dataset).await?;
/// assert_eq!(report.integrity_findings().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AnomalyEngine {
    config: AnalysisConfig,
    log_config: LogConfig,
}

impl AnomalyEngine {
    /// Creates an engine, rejecting an invalid configuration before any
    /// analyzer can run.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            log_config: LogConfig::default(),
        })
    }

    /// Sets the logging verbosity passed to every analyzer.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs all analyzers and returns the assembled report.
    pub async fn run(&self, dataset: &Dataset) -> Result<AnomalyReport> {
        self.run_with_cancellation(dataset, &CancellationToken::new())
            .await
    }

    /// Runs all analyzers unless `token` is cancelled first.
    ///
    /// On cancellation every analyzer task is aborted, partial results are
    /// dropped and [`GuardError::Cancelled`] is returned.
    #[instrument(skip(self, dataset, token), fields(
        airports = dataset.stats().airports,
        airlines = dataset.stats().airlines,
        routes = dataset.stats().routes,
    ))]
    pub async fn run_with_cancellation(
        &self,
        dataset: &Dataset,
        token: &CancellationToken,
    ) -> Result<AnomalyReport> {
        if token.is_cancelled() {
            return Err(GuardError::Cancelled);
        }
        info!(k = self.config.outlier_std_dev_multiplier, "Starting anomaly analysis");

        let integrity = spawn_analyzer(
            IntegrityAnalyzer::new().with_log_config(self.log_config.clone()),
            dataset,
        );
        let outliers = spawn_analyzer(
            OutlierAnalyzer::from_config(&self.config).with_log_config(self.log_config.clone()),
            dataset,
        );
        let ranking = spawn_analyzer(
            RankingAnalyzer::from_config(&self.config).with_log_config(self.log_config.clone()),
            dataset,
        );

        let aborts = [
            integrity.abort_handle(),
            outliers.abort_handle(),
            ranking.abort_handle(),
        ];

        let joined = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            results = futures::future::join3(integrity, outliers, ranking) => Some(results),
        };

        let Some((integrity, outliers, ranking)) = joined else {
            for handle in &aborts {
                handle.abort();
            }
            warn!("Analysis cancelled, partial results discarded");
            return Err(GuardError::Cancelled);
        };

        ReportAssembler::new(self.config.clone(), dataset.stats()).assemble(
            flatten(integrity),
            flatten(outliers),
            flatten(ranking),
        )
    }
}

fn spawn_analyzer<A>(analyzer: A, dataset: &Dataset) -> JoinHandle<Result<A::Output>>
where
    A: Analyzer + 'static,
    A::Output: 'static,
{
    let dataset = dataset.clone();
    tokio::spawn(async move {
        analyzer
            .analyze(&dataset)
            .await
            .map_err(|e| failed(analyzer.name(), e))
    })
}

fn flatten<T>(joined: std::result::Result<Result<T>, tokio::task::JoinError>) -> Result<T> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(GuardError::Cancelled),
        Err(e) => Err(GuardError::Internal(format!("Task join error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Airline, Airport, Route};

    fn dataset() -> Dataset {
        Dataset::from_records(
            &[Airport::new("JFK", "Kennedy"), Airport::new("LAX", "Los Angeles")],
            &[Airline::new("AA", "American"), Airline::new("UA", "United")],
            &[
                Route::new("JFK", "LAX", "AA"),
                Route::new("JFK", "LAX", "AA"),
                Route::new("LAX", "JFK", "UA"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let err = AnomalyEngine::new(AnalysisConfig::default().with_outlier_std_dev_multiplier(0.0))
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_run_produces_all_sections() {
        let report = AnomalyEngine::new(AnalysisConfig::default())
            .unwrap()
            .run(&dataset())
            .await
            .unwrap();
        assert_eq!(report.integrity_findings().len(), 1);
        assert_eq!(report.outlier_statistics().airports_analyzed, 2);
        assert_eq!(report.ranking().len(), 2);
        assert_eq!(report.ranking()[0].airline_code, "AA");
    }

    #[derive(Debug)]
    struct BrokenAnalyzer;

    #[async_trait::async_trait]
    impl Analyzer for BrokenAnalyzer {
        type Output = ();

        async fn analyze(&self, _dataset: &Dataset) -> Result<()> {
            Err(GuardError::Internal("snapshot table vanished".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_spawned_failure_is_labelled_with_analyzer_name() {
        let err = flatten(spawn_analyzer(BrokenAnalyzer, &dataset()).await).unwrap_err();
        match err {
            GuardError::AnalyzerFailed { analyzer, source } => {
                assert_eq!(analyzer, "broken");
                assert!(source.to_string().contains("snapshot table vanished"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_pre_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let err = AnomalyEngine::new(AnalysisConfig::default())
            .unwrap()
            .run_with_cancellation(&dataset(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Cancelled));
    }
}
