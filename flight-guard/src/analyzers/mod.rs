//! The three anomaly analyzers.
//!
//! Each analyzer reads the same immutable [`Dataset`] snapshot, runs one
//! DataFusion query against it and turns the result into typed findings.
//! Analyzers hold no mutable state, so the engine runs them concurrently.
//!
//! | analyzer | output |
//! |----------|--------|
//! | [`IntegrityAnalyzer`] | dangling, duplicate and incomplete route findings |
//! | [`OutlierAnalyzer`] | airports whose source-side route count is unusual |
//! | [`RankingAnalyzer`] | airlines densely ranked by operated routes |

use std::fmt::Debug;

use arrow::array::{Array, BooleanArray, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

use crate::dataset::Dataset;
use crate::error::{GuardError, Result};

pub mod integrity;
pub mod outliers;
pub mod ranking;

pub use integrity::{IntegrityAnalyzer, IntegrityFinding, IntegrityKind, RouteKey};
pub use outliers::{OutlierAnalysis, OutlierAnalyzer, OutlierDirection, OutlierFinding, OutlierStatistics};
pub use ranking::{RankingAnalyzer, RankingEntry};

/// An analysis over a dataset snapshot.
///
/// Implementations must be pure: the same snapshot and configuration always
/// produce the same output.
#[async_trait]
pub trait Analyzer: Send + Sync + Debug {
    /// The findings produced by this analyzer.
    type Output: Send + Debug;

    /// Runs the analysis against the snapshot.
    async fn analyze(&self, dataset: &Dataset) -> Result<Self::Output>;

    /// Returns the analyzer name used in logs and errors.
    fn name(&self) -> &str;
}

pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| GuardError::Internal(format!("expected Utf8 column '{name}'")))
}

pub(crate) fn int64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or_else(|| GuardError::Internal(format!("expected Int64 column '{name}'")))
}

pub(crate) fn bool_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a BooleanArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<BooleanArray>())
        .ok_or_else(|| GuardError::Internal(format!("expected Boolean column '{name}'")))
}

/// Reads a nullable string cell.
pub(crate) fn optional_str(array: &StringArray, row: usize) -> Option<String> {
    (!array.is_null(row)).then(|| array.value(row).to_string())
}

/// Reads a non-negative integer cell as `u64`.
pub(crate) fn count_at(array: &Int64Array, row: usize) -> Result<u64> {
    if array.is_null(row) {
        return Err(GuardError::Internal(format!("unexpected NULL count at row {row}")));
    }
    u64::try_from(array.value(row))
        .map_err(|_| GuardError::Internal(format!("negative count at row {row}")))
}
