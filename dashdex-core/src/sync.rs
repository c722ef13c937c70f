use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use dashdex_model::VideoFileRecord;
use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LibraryConfig;
use crate::gate::{ResourceGate, SyncGate};
use crate::path_parser::ClipPathParser;
use crate::probe::DurationProbe;
use crate::report::ErrorReporter;
use crate::scanner::ClipScanner;
use crate::store::{ClipIndex, IndexBatch};
use crate::{DashdexError, Result};

/// How aggressively a call reconciles the index against the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SyncMode {
    /// Serve the index as-is. An empty index still bootstraps with an
    /// incremental pass.
    None,
    /// Add newly discovered files, drop vanished ones, leave the rest alone.
    Incremental,
    /// Rebuild every record from scratch.
    Full,
}

/// Outcome of one sync call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Media files seen on disk.
    pub discovered: usize,
    /// Records written this cycle.
    pub added: usize,
    /// Records dropped because their file vanished (or a Full reset).
    pub removed: usize,
    /// New files whose paths did not match the recorder layout.
    pub parse_rejected: usize,
    /// Candidates dropped because the duration probe failed.
    pub probe_failed: usize,
    /// True when this call waited behind another sync and reused its result.
    pub coalesced: bool,
}

/// Reconciles the persisted index with filesystem reality.
///
/// One sync runs at a time process-wide; probe fan-out inside a run is
/// bounded by its own gate so a large backlog cannot spawn an unbounded
/// number of external processes.
pub struct SyncEngine {
    config: Arc<LibraryConfig>,
    index: Arc<dyn ClipIndex>,
    probe: Arc<dyn DurationProbe>,
    reporter: Arc<dyn ErrorReporter>,
    scanner: ClipScanner,
    sync_gate: SyncGate,
    probe_gate: Arc<ResourceGate>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("root", &self.config.root)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn new(
        config: Arc<LibraryConfig>,
        index: Arc<dyn ClipIndex>,
        probe: Arc<dyn DurationProbe>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let scanner = ClipScanner::new(config.video_extension.clone());
        let probe_gate = Arc::new(ResourceGate::new(config.probe_concurrency));
        Self {
            config,
            index,
            probe,
            reporter,
            scanner,
            sync_gate: SyncGate::new(),
            probe_gate,
        }
    }

    /// Reconcile per `mode`.
    ///
    /// Only root unavailability is an error; per-file parse and probe
    /// failures are isolated and reflected in the report counts.
    pub async fn sync(&self, mode: SyncMode) -> Result<SyncReport> {
        if mode == SyncMode::None {
            if !self.index.list_all().await?.is_empty() {
                return Ok(SyncReport::default());
            }
            debug!("empty index, bootstrapping with an incremental sync");
        }

        let ticket = self.sync_gate.enter().await;
        if ticket.coalesced() {
            debug!("sync coalesced onto a run that completed while waiting");
            return Ok(SyncReport {
                coalesced: true,
                ..SyncReport::default()
            });
        }

        let report = self.run(mode).await?;
        ticket.complete();
        Ok(report)
    }

    async fn run(&self, mode: SyncMode) -> Result<SyncReport> {
        let run_id = Uuid::new_v4();
        info!(%run_id, ?mode, root = %self.config.root.display(), "starting footage sync");

        let scanner = self.scanner.clone();
        let root = self.config.root.clone();
        let discovered = tokio::task::spawn_blocking(move || scanner.scan_root(&root))
            .await
            .map_err(|e| DashdexError::Internal(format!("scan task failed: {e}")))??;

        let existing = self.index.list_all().await?;

        // Full discards everything and reindexes from scratch; the discard
        // rides in the same atomic batch as the re-adds so a failed scan
        // never leaves a half-emptied index behind.
        let known: HashSet<PathBuf> = match mode {
            SyncMode::Full => HashSet::new(),
            SyncMode::Incremental | SyncMode::None => {
                existing.iter().map(|r| r.path.clone()).collect()
            }
        };

        let discovered_count = discovered.len();
        let discovered_set: HashSet<PathBuf> = discovered.iter().cloned().collect();
        let removals: Vec<PathBuf> = existing
            .iter()
            .map(|r| &r.path)
            .filter(|path| mode == SyncMode::Full || !discovered_set.contains(*path))
            .cloned()
            .collect();

        let mut parse_rejected = 0_usize;
        let mut candidates = Vec::new();
        for path in discovered {
            if known.contains(&path) {
                continue;
            }
            let Some(parsed) = ClipPathParser::parse(&path, &self.config.video_extension) else {
                parse_rejected += 1;
                continue;
            };
            let Some(url) = self.config.playback_url(&path) else {
                debug!(path = %path.display(), "no playback URL mapping, skipping");
                parse_rejected += 1;
                continue;
            };
            candidates.push((path, parsed, url));
        }

        let probed_total = candidates.len();
        let tasks: Vec<_> = candidates
            .into_iter()
            .map(|(path, parsed, url)| {
                let probe = self.probe.clone();
                let gate = self.probe_gate.clone();
                let reporter = self.reporter.clone();
                tokio::spawn(async move {
                    let _permit = gate.acquire().await;
                    match probe.probe(&path).await {
                        Ok(duration_secs) => Some(VideoFileRecord {
                            url,
                            clip_type: parsed.clip_type,
                            event_folder: parsed.event_folder,
                            camera: parsed.camera,
                            start_date: parsed.timestamp,
                            duration_secs,
                            path,
                        }),
                        Err(error) => {
                            reporter
                                .report(&error, &format!("probing {}", path.display()));
                            None
                        }
                    }
                })
            })
            .collect();

        let mut upserts = Vec::with_capacity(probed_total);
        for outcome in join_all(tasks).await {
            match outcome {
                Ok(Some(record)) => upserts.push(record),
                Ok(None) => {}
                Err(error) => warn!(%error, "probe task panicked"),
            }
        }

        let report = SyncReport {
            discovered: discovered_count,
            added: upserts.len(),
            removed: removals.len(),
            parse_rejected,
            probe_failed: probed_total - upserts.len(),
            coalesced: false,
        };

        let batch = IndexBatch { upserts, removals };
        if !batch.is_empty() {
            self.index.apply(batch).await?;
        }

        info!(
            %run_id,
            discovered = report.discovered,
            added = report.added,
            removed = report.removed,
            parse_rejected = report.parse_rejected,
            probe_failed = report.probe_failed,
            "footage sync complete"
        );
        Ok(report)
    }
}
