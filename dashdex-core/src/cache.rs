use std::sync::Arc;
use std::time::Duration;

use dashdex_model::Clip;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::Result;

#[derive(Debug)]
struct CacheEntry {
    clips: Arc<[Clip]>,
    refreshed_at: Instant,
}

/// Single-entry cache of the built clip array with sliding expiration.
///
/// Reads refresh the expiration clock. Rebuilds run under the entry lock so
/// racing readers after an invalidation converge on one build instead of
/// each re-deriving the array.
#[derive(Debug)]
pub struct ClipResultCache {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl ClipResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Fresh cached clips, if any. Refreshes the sliding window on hit.
    pub async fn get(&self) -> Option<Arc<[Clip]>> {
        let mut guard = self.entry.lock().await;
        match guard.as_mut() {
            Some(entry) if entry.refreshed_at.elapsed() < self.ttl => {
                entry.refreshed_at = Instant::now();
                Some(entry.clips.clone())
            }
            Some(_) => {
                debug!("clip cache entry expired");
                *guard = None;
                None
            }
            None => None,
        }
    }

    /// Drop the cached array. The next read rebuilds.
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }

    /// Serve the cached array or build and cache a fresh one.
    pub async fn get_or_build<F, Fut>(&self, build: F) -> Result<Arc<[Clip]>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Clip>>>,
    {
        let mut guard = self.entry.lock().await;
        if let Some(entry) = guard.as_mut() {
            if entry.refreshed_at.elapsed() < self.ttl {
                entry.refreshed_at = Instant::now();
                return Ok(entry.clips.clone());
            }
            *guard = None;
        }

        let clips: Arc<[Clip]> = build().await?.into();
        *guard = Some(CacheEntry {
            clips: clips.clone(),
            refreshed_at: Instant::now(),
        });
        Ok(clips)
    }
}
