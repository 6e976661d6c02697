//! Report formatting for anomaly reports.
//!
//! This module renders an [`AnomalyReport`] as JSON for programmatic
//! consumption or as human-readable text for consoles and logs.
//!
//! # Examples
//!
//! ```rust
//! use flight_guard::formatters::{FormatterConfig, HumanFormatter, ReportFormatter};
//! # use flight_guard::{config::AnalysisConfig, dataset::Dataset, engine::AnomalyEngine};
//! # #[tokio::main]
//! # async fn main() -> flight_guard::error::Result<()> {
//! # let dataset = Dataset::from_records(&[], &[], &[])?;
//! # let report = AnomalyEngine::new(AnalysisConfig::default())?.run(&dataset).await?;
//!
//! let formatter = HumanFormatter::with_config(FormatterConfig::ci());
//! let text = formatter.format(&report)?;
//! assert!(text.contains("No anomalies found"));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::{
    IntegrityFinding, IntegrityKind, OutlierDirection, OutlierFinding, OutlierStatistics,
    RankingEntry,
};
use crate::dataset::DatasetStats;
use crate::error::Result;
use crate::report::{AnomalyReport, AnomalySummary, DEFAULT_TOP_AIRLINES};

/// Configuration options for formatting anomaly reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include integrity findings
    pub include_integrity: bool,
    /// Include outlier findings and statistics
    pub include_outliers: bool,
    /// Include the airline ranking
    pub include_ranking: bool,
    /// Maximum findings shown per section (`None` for all)
    pub max_findings: Option<usize>,
    /// Number of ranking entries shown
    pub top_airlines: usize,
    /// Whether to use ANSI colors (human formatter only)
    pub use_colors: bool,
    /// Whether to include the generation time
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_integrity: true,
            include_outliers: true,
            include_ranking: true,
            max_findings: None,
            top_airlines: DEFAULT_TOP_AIRLINES,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a configuration showing only the summary counts.
    pub fn minimal() -> Self {
        Self {
            include_integrity: false,
            include_outliers: false,
            include_ranking: false,
            max_findings: Some(0),
            top_airlines: 0,
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Creates a configuration for CI logs: no colors, capped sections.
    pub fn ci() -> Self {
        Self {
            max_findings: Some(20),
            use_colors: false,
            ..Self::default()
        }
    }

    /// Caps the number of findings per section.
    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = Some(max);
        self
    }

    pub fn with_top_airlines(mut self, n: usize) -> Self {
        self.top_airlines = n;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }

    fn cap<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        match self.max_findings {
            Some(max) => &items[..max.min(items.len())],
            None => items,
        }
    }
}

/// Trait for rendering an anomaly report.
pub trait ReportFormatter {
    /// Formats a report using the formatter's own configuration.
    fn format(&self, report: &AnomalyReport) -> Result<String>;

    /// Formats a report with a custom configuration.
    fn format_with_config(&self, report: &AnomalyReport, _config: &FormatterConfig) -> Result<String> {
        self.format(report)
    }
}

#[derive(Serialize)]
struct JsonView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_at: Option<DateTime<Utc>>,
    dataset: DatasetStats,
    summary: AnomalySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    integrity: Option<&'a [IntegrityFinding]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outlier_statistics: Option<&'a OutlierStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outliers: Option<&'a [OutlierFinding]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranking: Option<&'a [RankingEntry]>,
    truncated: bool,
}

/// Formats reports as structured JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &AnomalyReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &AnomalyReport, config: &FormatterConfig) -> Result<String> {
        let integrity = config.cap(report.integrity_findings());
        let outliers = config.cap(report.outlier_findings());
        let ranking = report.top_airlines(config.top_airlines);
        let truncated = (config.include_integrity
            && integrity.len() < report.integrity_findings().len())
            || (config.include_outliers && outliers.len() < report.outlier_findings().len());

        let view = JsonView {
            generated_at: config.include_timestamps.then(|| report.generated_at()),
            dataset: report.dataset_stats(),
            summary: report.summary(),
            integrity: config.include_integrity.then_some(integrity),
            outlier_statistics: config.include_outliers.then(|| report.outlier_statistics()),
            outliers: config.include_outliers.then_some(outliers),
            ranking: config.include_ranking.then_some(ranking),
            truncated,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&view)?
        } else {
            serde_json::to_string(&view)?
        };
        Ok(json)
    }
}

/// Formats reports as console text.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{color}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &AnomalyReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &AnomalyReport, config: &FormatterConfig) -> Result<String> {
        let summary = report.summary();
        let stats = report.dataset_stats();
        let colors = config.use_colors;
        let mut lines: Vec<String> = vec![String::new()];

        if report.is_clean() {
            lines.push(format!("✅ {}", paint("No anomalies found", "32", colors)));
        } else {
            lines.push(format!(
                "❌ {}",
                paint(
                    &format!(
                        "{} integrity findings, {} outlier airports",
                        summary.integrity_total(),
                        summary.outliers_total()
                    ),
                    "31",
                    colors
                )
            ));
        }
        lines.push(String::new());
        if config.include_timestamps {
            lines.push(format!("Generated: {}", report.generated_at().to_rfc3339()));
        }
        lines.push(format!(
            "Dataset: {} airports, {} airlines, {} routes",
            stats.airports, stats.airlines, stats.routes
        ));

        lines.push(String::new());
        lines.push("📊 Anomaly Summary:".to_string());
        for kind in IntegrityKind::ALL {
            lines.push(format!("   {:<28} {}", kind.as_str(), summary.count(kind)));
        }
        lines.push(format!("   {:<28} {}", "high-outlier", summary.high_outliers));
        lines.push(format!("   {:<28} {}", "low-outlier", summary.low_outliers));

        if config.include_integrity && !report.integrity_findings().is_empty() {
            let shown = config.cap(report.integrity_findings());
            lines.push(String::new());
            lines.push("🔍 Integrity Findings:".to_string());
            for finding in shown {
                lines.push(format!(
                    "   {} {}",
                    paint(&format!("[{}]", finding.kind), "33", colors),
                    finding.description
                ));
            }
            push_remaining(&mut lines, report.integrity_findings().len() - shown.len());
        }

        if config.include_outliers {
            let statistics = report.outlier_statistics();
            lines.push(String::new());
            lines.push(format!(
                "📈 Route-count Outliers (k = {}):",
                statistics.multiplier
            ));
            match (statistics.mean, statistics.std_dev) {
                (Some(mean), Some(std_dev)) => lines.push(format!(
                    "   {} airports analyzed, mean {mean:.2}, std dev {std_dev:.2}",
                    statistics.airports_analyzed
                )),
                _ => lines.push("   no airport has any route".to_string()),
            }
            let shown = config.cap(report.outlier_findings());
            for finding in shown {
                let arrow = match finding.direction {
                    OutlierDirection::High => "▲",
                    OutlierDirection::Low => "▼",
                };
                lines.push(format!(
                    "   {arrow} {} routes={} deviation={:+.2}",
                    finding.airport_code, finding.route_count, finding.deviation
                ));
            }
            push_remaining(&mut lines, report.outlier_findings().len() - shown.len());
        }

        if config.include_ranking && config.top_airlines > 0 && !report.ranking().is_empty() {
            lines.push(String::new());
            lines.push(format!("🏆 Top {} Airlines by Routes:", config.top_airlines));
            for entry in report.top_airlines(config.top_airlines) {
                let tie = if entry.tied { " (tied)" } else { "" };
                lines.push(format!(
                    "   {:>3}. {:<8} {}{tie}",
                    entry.rank, entry.airline_code, entry.route_count
                ));
            }
        }

        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

fn push_remaining(lines: &mut Vec<String>, hidden: usize) {
    if hidden > 0 {
        lines.push(format!("   ... and {hidden} more"));
    }
}
