//! In-memory run history for tests and embedding.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{RunHistory, RunRecord};
use crate::error::Result;

/// Keeps run records in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunHistory {
    records: Arc<RwLock<Vec<RunRecord>>>,
}

impl InMemoryRunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Removes all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl RunHistory for InMemoryRunHistory {
    #[instrument(skip(self, record), fields(run_id = %record.run_id, history = "in_memory"))]
    async fn append(&self, record: RunRecord) -> Result<()> {
        record.key.validate_tags()?;
        self.records.write().await.push(record);
        Ok(())
    }

    async fn load(&self) -> Result<Vec<RunRecord>> {
        Ok(self.records.read().await.clone())
    }
}
