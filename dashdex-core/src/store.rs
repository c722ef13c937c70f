use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use dashdex_model::VideoFileRecord;
use tokio::sync::RwLock;

use crate::Result;

/// One sync cycle's mutations, applied to the index in a single write.
#[derive(Debug, Clone, Default)]
pub struct IndexBatch {
    pub upserts: Vec<VideoFileRecord>,
    pub removals: Vec<PathBuf>,
}

impl IndexBatch {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }
}

/// Persisted keyed store of indexed footage, keyed by file path.
///
/// Persistence technology is the host's choice; the shipped implementation
/// is in-memory. Implementations must be safe for concurrent callers.
#[async_trait]
pub trait ClipIndex: Send + Sync {
    async fn list_all(&self) -> Result<Vec<VideoFileRecord>>;

    async fn upsert_batch(&self, records: Vec<VideoFileRecord>) -> Result<()>;

    async fn delete_batch(&self, paths: Vec<PathBuf>) -> Result<()>;

    /// Apply removals and upserts as one atomic write. The default runs two
    /// writes; transactional backends should override.
    async fn apply(&self, batch: IndexBatch) -> Result<()> {
        self.delete_batch(batch.removals).await?;
        self.upsert_batch(batch.upserts).await
    }
}

/// Process-lifetime in-memory index.
#[derive(Debug, Default)]
pub struct InMemoryClipIndex {
    records: RwLock<HashMap<PathBuf, VideoFileRecord>>,
}

impl InMemoryClipIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClipIndex for InMemoryClipIndex {
    async fn list_all(&self) -> Result<Vec<VideoFileRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn upsert_batch(&self, records: Vec<VideoFileRecord>) -> Result<()> {
        let mut guard = self.records.write().await;
        for record in records {
            guard.insert(record.path.clone(), record);
        }
        Ok(())
    }

    async fn delete_batch(&self, paths: Vec<PathBuf>) -> Result<()> {
        let mut guard = self.records.write().await;
        for path in paths {
            guard.remove(&path);
        }
        Ok(())
    }

    async fn apply(&self, batch: IndexBatch) -> Result<()> {
        // Single write guard keeps the batch atomic for readers.
        let mut guard = self.records.write().await;
        for path in batch.removals {
            guard.remove(&path);
        }
        for record in batch.upserts {
            guard.insert(record.path.clone(), record);
        }
        Ok(())
    }
}
