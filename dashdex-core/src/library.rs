use std::sync::Arc;

use dashdex_model::Clip;
use tracing::debug;

use crate::builder::ClipBuilder;
use crate::cache::ClipResultCache;
use crate::config::LibraryConfig;
use crate::events::EventMetadataCache;
use crate::probe::DurationProbe;
use crate::report::ErrorReporter;
use crate::store::ClipIndex;
use crate::sync::{SyncEngine, SyncMode};
use crate::Result;

/// Facade over one indexed footage tree: sync, build, cache, serve.
///
/// Construct once per root and share via `Arc`; every piece of shared state
/// lives inside and persists for the process lifetime.
pub struct ClipLibrary {
    sync: SyncEngine,
    builder: ClipBuilder,
    cache: ClipResultCache,
    index: Arc<dyn ClipIndex>,
}

impl std::fmt::Debug for ClipLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipLibrary")
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

impl ClipLibrary {
    pub fn new(
        config: LibraryConfig,
        index: Arc<dyn ClipIndex>,
        probe: Arc<dyn DurationProbe>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let config = Arc::new(config);
        let events = Arc::new(EventMetadataCache::new());
        let cache = ClipResultCache::new(config.clip_cache_ttl);
        let sync = SyncEngine::new(config.clone(), index.clone(), probe, reporter);
        let builder = ClipBuilder::new(config, events);
        Self {
            sync,
            builder,
            cache,
            index,
        }
    }

    /// Reconcile per `mode`, then serve the clip array sorted descending by
    /// start date.
    ///
    /// `SyncMode::None` with a fresh cache entry touches neither the
    /// filesystem nor the probe. Any actual sync invalidates the cache
    /// before the rebuild.
    pub async fn get_clips(&self, mode: SyncMode) -> Result<Arc<[Clip]>> {
        if mode == SyncMode::None {
            if let Some(clips) = self.cache.get().await {
                return Ok(clips);
            }
        } else {
            self.cache.invalidate().await;
        }

        let report = self.sync.sync(mode).await?;
        debug!(?mode, ?report, "sync finished, serving clips");

        self.cache
            .get_or_build(|| async {
                let records = self.index.list_all().await?;
                Ok(self.builder.build(records).await)
            })
            .await
    }
}
