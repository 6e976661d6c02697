//! Prelude for commonly used types and traits in flight-guard.

pub use crate::analyzers::{
    Analyzer, IntegrityFinding, IntegrityKind, OutlierDirection, OutlierFinding, RankingEntry,
};
pub use crate::cancellation::CancellationToken;
pub use crate::config::AnalysisConfig;
pub use crate::dataset::{Dataset, SourceTables};
pub use crate::engine::AnomalyEngine;
pub use crate::error::{ErrorContext, GuardError, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::history::RunHistory;
pub use crate::logging::LogConfig;
pub use crate::model::{Airline, Airport, Route};
pub use crate::report::{AnomalyReport, AnomalySummary};
