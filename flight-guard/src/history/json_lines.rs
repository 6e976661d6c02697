//! Append-only JSON lines run history.
//!
//! Each call to [`RunHistory::append`] writes one line holding a serialized
//! [`RunRecord`]. Existing lines are never rewritten.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{RunHistory, RunRecord};
use crate::error::{GuardError, Result};

/// Run history stored as a JSON lines file.
#[derive(Debug)]
pub struct JsonLinesRunHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesRunHistory {
    /// Uses the file at `path`, which is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RunHistory for JsonLinesRunHistory {
    #[instrument(skip(self, record), fields(run_id = %record.run_id, path = %self.path.display()))]
    async fn append(&self, record: RunRecord) -> Result<()> {
        record.key.validate_tags()?;
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!("Appended run record");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<RunRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| {
                    GuardError::History(format!(
                        "{}: invalid record on line {}: {e}",
                        self.path.display(),
                        index + 1
                    ))
                })
            })
            .collect()
    }
}
