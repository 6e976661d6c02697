//! Route-count outliers per source airport.
//!
//! The analyzed metric is the number of routes departing from an airport.
//! Only airports with at least one route take part, and only routes whose
//! source resolves to a known airport are counted. With population mean `μ`
//! and population standard deviation `σ`, an airport is a high outlier when
//! `count > μ + kσ` and a low outlier when `count < μ − kσ`. Both bounds are
//! strict.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{count_at, int64_column, string_column, Analyzer};
use crate::config::{AnalysisConfig, DEFAULT_OUTLIER_STD_DEV_MULTIPLIER};
use crate::dataset::Dataset;
use crate::error::{GuardError, Result};
use crate::logging::LogConfig;
use crate::stats::{population_mean, population_std_dev};
use crate::{log_finding, log_query};

const ROUTE_COUNTS_SQL: &str = "\
SELECT a.code AS airport_code, COUNT(r.route_seq) AS route_count
FROM airports a
JOIN routes r ON r.source_airport = a.code
GROUP BY a.code
ORDER BY airport_code";

/// Which side of the mean an outlier lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierDirection {
    High,
    Low,
}

impl fmt::Display for OutlierDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlierDirection::High => f.write_str("high"),
            OutlierDirection::Low => f.write_str("low"),
        }
    }
}

/// An airport whose route count lies outside `μ ± kσ`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFinding {
    pub airport_code: String,
    pub route_count: u64,
    /// Population mean of the analyzed counts
    pub mean: f64,
    /// Population standard deviation of the analyzed counts
    pub std_dev: f64,
    /// `(route_count - mean) / std_dev`
    pub deviation: f64,
    pub direction: OutlierDirection,
}

/// Population statistics behind an outlier scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierStatistics {
    /// Airports with at least one route
    pub airports_analyzed: usize,
    /// `None` when no airport has a route
    pub mean: Option<f64>,
    /// `None` when no airport has a route
    pub std_dev: Option<f64>,
    /// The multiplier `k` in effect
    pub multiplier: f64,
}

/// Findings plus the statistics they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierAnalysis {
    pub statistics: OutlierStatistics,
    pub findings: Vec<OutlierFinding>,
}

/// Flags airports with an unusual number of departing routes.
#[derive(Debug, Clone)]
pub struct OutlierAnalyzer {
    multiplier: f64,
    log_config: LogConfig,
}

impl Default for OutlierAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_STD_DEV_MULTIPLIER)
    }
}

impl OutlierAnalyzer {
    /// Creates an analyzer flagging counts beyond `multiplier` standard
    /// deviations.
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            log_config: LogConfig::default(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.outlier_std_dev_multiplier)
    }

    /// Sets the logging verbosity.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Flags outliers among `(airport, count)` pairs.
    ///
    /// Fails when the multiplier is not a finite positive number.
    pub fn detect(&self, counts: &[(String, u64)]) -> Result<OutlierAnalysis> {
        let k = self.multiplier;
        if !k.is_finite() || k <= 0.0 {
            return Err(GuardError::configuration(format!(
                "outlier_std_dev_multiplier must be a finite value greater than 0, got {k}"
            )));
        }

        let values: Vec<u64> = counts.iter().map(|(_, c)| *c).collect();
        let mean = population_mean(&values);
        let std_dev = population_std_dev(&values);
        let statistics = OutlierStatistics {
            airports_analyzed: counts.len(),
            mean,
            std_dev,
            multiplier: k,
        };

        let (Some(mean), Some(std_dev)) = (mean, std_dev) else {
            return Ok(OutlierAnalysis {
                statistics,
                findings: Vec::new(),
            });
        };
        if counts.len() < 2 || std_dev == 0.0 {
            debug!(airports = counts.len(), std_dev, "No spread to analyze");
            return Ok(OutlierAnalysis {
                statistics,
                findings: Vec::new(),
            });
        }

        let upper = mean + k * std_dev;
        let lower = mean - k * std_dev;
        let mut findings: Vec<OutlierFinding> = counts
            .iter()
            .filter_map(|(code, count)| {
                let value = *count as f64;
                let direction = if value > upper {
                    OutlierDirection::High
                } else if value < lower {
                    OutlierDirection::Low
                } else {
                    return None;
                };
                Some(OutlierFinding {
                    airport_code: code.clone(),
                    route_count: *count,
                    mean,
                    std_dev,
                    deviation: (value - mean) / std_dev,
                    direction,
                })
            })
            .collect();

        findings.sort_by(|a, b| {
            let da = (a.route_count as f64 - mean).abs();
            let db = (b.route_count as f64 - mean).abs();
            db.total_cmp(&da)
                .then_with(|| a.airport_code.cmp(&b.airport_code))
        });

        Ok(OutlierAnalysis {
            statistics,
            findings,
        })
    }
}

#[async_trait]
impl Analyzer for OutlierAnalyzer {
    type Output = OutlierAnalysis;

    #[instrument(skip(self, dataset), fields(analyzer = "outliers", k = self.multiplier))]
    async fn analyze(&self, dataset: &Dataset) -> Result<Self::Output> {
        log_query!(self.log_config, "outliers", ROUTE_COUNTS_SQL);
        let batches = dataset
            .context()
            .sql(ROUTE_COUNTS_SQL)
            .await?
            .collect()
            .await?;

        let mut counts = Vec::new();
        for batch in &batches {
            let codes = string_column(batch, "airport_code")?;
            let route_counts = int64_column(batch, "route_count")?;
            for row in 0..batch.num_rows() {
                counts.push((codes.value(row).to_string(), count_at(route_counts, row)?));
            }
        }

        let analysis = self.detect(&counts)?;
        for finding in &analysis.findings {
            log_finding!(
                self.log_config,
                airport = %finding.airport_code,
                route_count = finding.route_count,
                deviation = finding.deviation,
                direction = %finding.direction,
                "Outlier airport"
            );
        }
        info!(
            airports = analysis.statistics.airports_analyzed,
            outliers = analysis.findings.len(),
            "Outlier analysis finished"
        );
        Ok(analysis)
    }

    fn name(&self) -> &str {
        "outliers"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: &[(&str, u64)]) -> Vec<(String, u64)> {
        values.iter().map(|(c, n)| (c.to_string(), *n)).collect()
    }

    #[test]
    fn test_threshold_is_strict() {
        let analysis = OutlierAnalyzer::new(2.0)
            .detect(&counts(&[("A", 10), ("B", 10), ("C", 10), ("D", 10), ("E", 100)]))
            .unwrap();
        assert_eq!(analysis.statistics.mean, Some(28.0));
        assert_eq!(analysis.statistics.std_dev, Some(36.0));
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn test_high_outlier() {
        let mut values: Vec<(String, u64)> = (0..9).map(|i| (format!("A{i}"), 10)).collect();
        values.push(("HUB".to_string(), 100));
        let analysis = OutlierAnalyzer::new(2.0).detect(&values).unwrap();
        assert_eq!(analysis.findings.len(), 1);
        let finding = &analysis.findings[0];
        assert_eq!(finding.airport_code, "HUB");
        assert_eq!(finding.direction, OutlierDirection::High);
        assert_eq!(finding.mean, 19.0);
        assert_eq!(finding.std_dev, 27.0);
        assert_eq!(finding.deviation, 3.0);
    }

    #[test]
    fn test_low_outlier() {
        let mut values: Vec<(String, u64)> = (0..9).map(|i| (format!("A{i}"), 100)).collect();
        values.push(("TINY".to_string(), 10));
        let analysis = OutlierAnalyzer::new(2.0).detect(&values).unwrap();
        assert_eq!(analysis.findings.len(), 1);
        assert_eq!(analysis.findings[0].direction, OutlierDirection::Low);
        assert_eq!(analysis.findings[0].deviation, -3.0);
    }

    #[test]
    fn test_zero_variance_flags_nothing() {
        let values = counts(&[("A", 5), ("B", 5), ("C", 5)]);
        for k in [0.001, 1.0, 2.0, 100.0] {
            assert!(OutlierAnalyzer::new(k).detect(&values).unwrap().findings.is_empty());
        }
    }

    #[test]
    fn test_fewer_than_two_airports() {
        let analysis = OutlierAnalyzer::new(2.0).detect(&counts(&[("A", 500)])).unwrap();
        assert!(analysis.findings.is_empty());
        assert_eq!(analysis.statistics.airports_analyzed, 1);

        let analysis = OutlierAnalyzer::new(2.0).detect(&[]).unwrap();
        assert!(analysis.findings.is_empty());
        assert_eq!(analysis.statistics.mean, None);
    }

    #[test]
    fn test_order_by_deviation_then_code() {
        // mean 10, std dev ~7.16; every non-mean airport is 8 away
        let analysis = OutlierAnalyzer::new(0.5)
            .detect(&counts(&[("ZZZ", 2), ("AAA", 18), ("MMM", 10), ("BBB", 2), ("CCC", 18)]))
            .unwrap();
        let order: Vec<&str> = analysis
            .findings
            .iter()
            .map(|f| f.airport_code.as_str())
            .collect();
        assert_eq!(order, vec!["AAA", "BBB", "CCC", "ZZZ"]);
    }

    #[test]
    fn test_invalid_multiplier() {
        let err = OutlierAnalyzer::new(f64::NAN).detect(&[]).unwrap_err();
        assert!(err.is_config_error());
    }
}
