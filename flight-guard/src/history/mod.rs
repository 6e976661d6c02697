//! Run history for tracking anomaly counts across analysis runs.
//!
//! Every run can be recorded as a [`RunRecord`]: the run key (timestamp and
//! tags), the analyzed dataset size and the per-type anomaly counts. Full
//! findings are not stored; the history answers "is data quality getting
//! better or worse", not "which route was broken".
//!
//! Backends implement [`RunHistory`]. Two are provided:
//! [`InMemoryRunHistory`] for tests and embedding, and
//! [`JsonLinesRunHistory`], an append-only file with one JSON object per
//! run.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetStats;
use crate::error::{GuardError, Result};
use crate::report::{AnomalyReport, AnomalySummary};

pub mod in_memory;
pub mod json_lines;

pub use in_memory::InMemoryRunHistory;
pub use json_lines::JsonLinesRunHistory;

const MAX_TAG_COUNT: usize = 100;
const MAX_TAG_KEY_LENGTH: usize = 256;
const MAX_TAG_VALUE_LENGTH: usize = 1024;

/// Identifies one recorded run.
///
/// # Example
///
/// ```rust
/// use flight_guard::history::RunKey;
///
/// let key = RunKey::new(1_700_000_000_000)
///     .with_tag("environment", "staging")
///     .with_tag("source", "openflights");
/// assert_eq!(key.run_id(), "20231114T221320Z");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunKey {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,

    /// Tags for categorizing and filtering runs.
    pub tags: BTreeMap<String, String>,
}

impl RunKey {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            tags: BTreeMap::new(),
        }
    }

    /// Adds a tag to the run key.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds multiple tags to the run key.
    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in tags {
            self.tags.insert(k.into(), v.into());
        }
        self
    }

    /// Returns the timestamp as a chrono DateTime.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Compact UTC run identifier, e.g. `20240131T235959Z`.
    pub fn run_id(&self) -> String {
        self.as_datetime().format("%Y%m%dT%H%M%SZ").to_string()
    }

    /// Checks if all the specified tags match.
    pub fn matches_tags(&self, tags: &BTreeMap<String, String>) -> bool {
        tags.iter().all(|(k, v)| self.tags.get(k) == Some(v))
    }

    /// Validates that tag keys and values are safe for storage.
    pub fn validate_tags(&self) -> Result<()> {
        if self.tags.len() > MAX_TAG_COUNT {
            return Err(GuardError::History(format!(
                "Too many tags: {} (max: {MAX_TAG_COUNT})",
                self.tags.len()
            )));
        }
        for (key, value) in &self.tags {
            if key.trim().is_empty() {
                return Err(GuardError::History("Tag key cannot be empty".to_string()));
            }
            if key.len() > MAX_TAG_KEY_LENGTH {
                return Err(GuardError::History(format!(
                    "Tag key too long: {} characters (max: {MAX_TAG_KEY_LENGTH})",
                    key.len()
                )));
            }
            if value.len() > MAX_TAG_VALUE_LENGTH {
                return Err(GuardError::History(format!(
                    "Tag value for '{key}' too long: {} characters (max: {MAX_TAG_VALUE_LENGTH})",
                    value.len()
                )));
            }
            if key.chars().chain(value.chars()).any(char::is_control) {
                return Err(GuardError::History(format!(
                    "Tag '{key}' contains control characters"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.run_id())?;
        for (k, v) in &self.tags {
            write!(f, " {k}={v}")?;
        }
        Ok(())
    }
}

/// One entry in the run history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub key: RunKey,
    pub generated_at: DateTime<Utc>,
    pub dataset: DatasetStats,
    pub summary: AnomalySummary,
}

impl RunRecord {
    /// Builds a record from a report.
    pub fn from_report(report: &AnomalyReport, tags: BTreeMap<String, String>) -> Self {
        let key = RunKey::new(report.generated_at().timestamp_millis()).with_tags(tags);
        Self {
            run_id: key.run_id(),
            key,
            generated_at: report.generated_at(),
            dataset: report.dataset_stats(),
            summary: report.summary(),
        }
    }
}

/// Storage backend for run records.
#[async_trait]
pub trait RunHistory: Send + Sync {
    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the tags are invalid or the backend cannot write.
    async fn append(&self, record: RunRecord) -> Result<()>;

    /// Loads all records in the order they were appended.
    async fn load(&self) -> Result<Vec<RunRecord>>;

    /// Summarizes a report and appends it, returning the run key.
    async fn record(
        &self,
        report: &AnomalyReport,
        tags: BTreeMap<String, String>,
    ) -> Result<RunKey> {
        let record = RunRecord::from_report(report, tags);
        record.key.validate_tags()?;
        let key = record.key.clone();
        self.append(record).await?;
        Ok(key)
    }

    /// Returns the most recently generated record, if any.
    async fn latest(&self) -> Result<Option<RunRecord>> {
        let records = self.load().await?;
        Ok(records.into_iter().max_by_key(|r| r.key.timestamp))
    }

    /// Returns records whose tags include all of `tags`.
    async fn find(&self, tags: &BTreeMap<String, String>) -> Result<Vec<RunRecord>> {
        let records = self.load().await?;
        Ok(records
            .into_iter()
            .filter(|r| r.key.matches_tags(tags))
            .collect())
    }
}
