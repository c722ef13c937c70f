//! End-to-end pipeline tests: seeded footage tree -> sync -> clips.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashdex_core::{
    ClipLibrary, ClipType, DurationProbe, ErrorReporter, InMemoryClipIndex, LibraryConfig,
    ProbeError, SyncEngine, SyncMode,
};
use tempfile::TempDir;

/// Scripted probe: fixed duration, optional latency, per-path failures,
/// invocation counting.
struct StubProbe {
    duration_secs: f64,
    latency: Duration,
    fail_substring: Option<String>,
    invocations: AtomicUsize,
}

impl StubProbe {
    fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            latency: Duration::ZERO,
            fail_substring: None,
            invocations: AtomicUsize::new(0),
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn failing_on(mut self, substring: &str) -> Self {
        self.fail_substring = Some(substring.to_string());
        self
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurationProbe for StubProbe {
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(marker) = &self.fail_substring {
            if path.to_string_lossy().contains(marker.as_str()) {
                return Err(ProbeError::BadOutput("scripted failure".to_string()));
            }
        }
        Ok(self.duration_secs)
    }
}

/// Collects report contexts instead of logging them.
#[derive(Default)]
struct CollectingReporter {
    contexts: std::sync::Mutex<Vec<String>>,
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, _error: &(dyn std::error::Error + 'static), context: &str) {
        self.contexts.lock().unwrap().push(context.to_string());
    }
}

fn write_clip(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"video-bytes").unwrap();
    path
}

/// A tree with one two-segment recent session, a separate later session,
/// and one sentry event with a sidecar.
fn seed_tree(root: &Path) {
    write_clip(root, "RecentClips/2024-03-01_08-00-00-front.mp4");
    write_clip(root, "RecentClips/2024-03-01_08-00-00-back.mp4");
    write_clip(root, "RecentClips/2024-03-01_08-01-00-front.mp4");
    write_clip(root, "RecentClips/2024-03-01_08-12-00-front.mp4");

    write_clip(
        root,
        "SentryClips/2024-03-01_17-30-00/2024-03-01_17-30-00-front.mp4",
    );
    write_clip(
        root,
        "SentryClips/2024-03-01_17-30-00/2024-03-01_17-31-00-front.mp4",
    );
    fs::write(
        root.join("SentryClips/2024-03-01_17-30-00/event.json"),
        r#"{"timestamp": "2024-03-01T17:30:00", "reason": "sentry_aware_object_detection", "city": "Boulder"}"#,
    )
    .unwrap();
    fs::write(
        root.join("SentryClips/2024-03-01_17-30-00/thumb.png"),
        b"png",
    )
    .unwrap();

    // Noise the scanner sees and the parser rejects.
    write_clip(root, "RecentClips/notes-about-a-drive.mp4");
    fs::write(root.join("RecentClips/readme.txt"), b"not media").unwrap();
}

fn library_over(root: &Path, probe: Arc<StubProbe>) -> ClipLibrary {
    ClipLibrary::new(
        LibraryConfig::new(root),
        Arc::new(InMemoryClipIndex::new()),
        probe,
        Arc::new(CollectingReporter::default()),
    )
}

#[tokio::test]
async fn test_full_pipeline_end_to_end() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    seed_tree(temp.path());

    let probe = Arc::new(StubProbe::new(60.0));
    let library = library_over(temp.path(), probe.clone());

    let clips = library.get_clips(SyncMode::Incremental).await?;

    // Two recent sessions (660s gap) plus one sentry event.
    assert_eq!(clips.len(), 3);
    assert!(
        clips
            .windows(2)
            .all(|pair| pair[0].start_date() >= pair[1].start_date()),
        "clips must be sorted descending by start"
    );

    let sentry = &clips[0];
    assert_eq!(sentry.clip_type(), ClipType::Sentry);
    assert_eq!(sentry.segments().len(), 2);
    let event = sentry.event().expect("sidecar should populate the event");
    assert_eq!(event.reason, "sentry_aware_object_detection");
    assert_eq!(event.city.as_deref(), Some("Boulder"));
    assert_eq!(
        sentry.thumbnail_url(),
        Some("/videos/SentryClips/2024-03-01_17-30-00/thumb.png")
    );

    let late_recent = &clips[1];
    assert_eq!(late_recent.clip_type(), ClipType::Recent);
    assert_eq!(late_recent.segments().len(), 1);

    let early_recent = &clips[2];
    assert_eq!(early_recent.segments().len(), 2);
    assert_eq!(early_recent.segments()[0].angle_count(), 2);
    assert_eq!(early_recent.total_seconds(), 120.0);

    // Six valid files probed; the non-matching filename never reached the
    // probe.
    assert_eq!(probe.invocations(), 6);
    Ok(())
}

#[tokio::test]
async fn test_probe_failure_drops_only_that_file() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_clip(temp.path(), "RecentClips/2024-03-01_08-00-00-front.mp4");
    write_clip(temp.path(), "RecentClips/2024-03-01_08-00-00-back.mp4");

    let probe = Arc::new(StubProbe::new(60.0).failing_on("back"));
    let reporter = Arc::new(CollectingReporter::default());
    let library = ClipLibrary::new(
        LibraryConfig::new(temp.path()),
        Arc::new(InMemoryClipIndex::new()),
        probe,
        reporter.clone(),
    );

    let clips = library.get_clips(SyncMode::Incremental).await?;
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].segments()[0].angle_count(), 1);

    let contexts = reporter.contexts.lock().unwrap();
    assert_eq!(contexts.len(), 1);
    assert!(contexts[0].contains("back"));
    Ok(())
}

#[tokio::test]
async fn test_missing_root_propagates() {
    let probe = Arc::new(StubProbe::new(60.0));
    let library = library_over(Path::new("/nonexistent/dashdex-footage"), probe);
    assert!(library.get_clips(SyncMode::Incremental).await.is_err());
}

#[tokio::test]
async fn test_deleted_file_leaves_index_on_next_sync() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let doomed = write_clip(temp.path(), "RecentClips/2024-03-01_08-00-00-front.mp4");
    write_clip(temp.path(), "RecentClips/2024-03-01_09-00-00-front.mp4");

    let probe = Arc::new(StubProbe::new(60.0));
    let library = library_over(temp.path(), probe.clone());

    let clips = library.get_clips(SyncMode::Incremental).await?;
    assert_eq!(clips.len(), 2);

    fs::remove_file(&doomed)?;

    // Cached view still serves the stale record without touching disk.
    let cached = library.get_clips(SyncMode::None).await?;
    assert_eq!(cached.len(), 2);
    assert_eq!(probe.invocations(), 2);

    // The next incremental sync reconciles it away.
    let clips = library.get_clips(SyncMode::Incremental).await?;
    assert_eq!(clips.len(), 1);
    assert_eq!(
        clips[0]
            .segments()[0]
            .record(dashdex_core::Camera::Front)
            .unwrap()
            .url,
        "/videos/RecentClips/2024-03-01_09-00-00-front.mp4"
    );
    // Surviving record was not re-probed.
    assert_eq!(probe.invocations(), 2);
    Ok(())
}

#[tokio::test]
async fn test_full_sync_reprobes_everything() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_clip(temp.path(), "RecentClips/2024-03-01_08-00-00-front.mp4");

    let probe = Arc::new(StubProbe::new(60.0));
    let library = library_over(temp.path(), probe.clone());

    library.get_clips(SyncMode::Incremental).await?;
    assert_eq!(probe.invocations(), 1);

    library.get_clips(SyncMode::Incremental).await?;
    assert_eq!(probe.invocations(), 1, "incremental must not re-probe");

    library.get_clips(SyncMode::Full).await?;
    assert_eq!(probe.invocations(), 2, "full discards and re-probes");
    Ok(())
}

#[tokio::test]
async fn test_mode_none_bootstraps_empty_index() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_clip(temp.path(), "RecentClips/2024-03-01_08-00-00-front.mp4");

    let probe = Arc::new(StubProbe::new(60.0));
    let library = library_over(temp.path(), probe.clone());

    let clips = library.get_clips(SyncMode::None).await?;
    assert_eq!(clips.len(), 1);
    assert_eq!(probe.invocations(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_full_syncs_single_flight() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_clip(temp.path(), "RecentClips/2024-03-01_08-00-00-front.mp4");
    write_clip(temp.path(), "RecentClips/2024-03-01_08-01-00-front.mp4");
    write_clip(
        temp.path(),
        "SentryClips/2024-03-01_17-30-00/2024-03-01_17-30-00-front.mp4",
    );

    let probe = Arc::new(StubProbe::new(60.0).with_latency(Duration::from_millis(50)));
    let engine = Arc::new(SyncEngine::new(
        Arc::new(LibraryConfig::new(temp.path())),
        Arc::new(InMemoryClipIndex::new()),
        probe.clone(),
        Arc::new(CollectingReporter::default()),
    ));

    let barrier = Arc::new(tokio::sync::Barrier::new(8));
    let callers: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                engine.sync(SyncMode::Full).await
            })
        })
        .collect();

    let mut performed = 0;
    let mut coalesced = 0;
    for caller in callers {
        let report = caller.await??;
        if report.coalesced {
            coalesced += 1;
        } else {
            performed += 1;
            assert_eq!(report.added, 3);
        }
    }

    assert_eq!(performed, 1, "exactly one caller may scan");
    assert_eq!(coalesced, 7);
    assert_eq!(probe.invocations(), 3, "exactly one probe batch");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_clips_share_one_probe_batch() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    write_clip(temp.path(), "RecentClips/2024-03-01_08-00-00-front.mp4");
    write_clip(temp.path(), "RecentClips/2024-03-01_08-01-00-front.mp4");

    let probe = Arc::new(StubProbe::new(60.0).with_latency(Duration::from_millis(50)));
    let library = Arc::new(library_over(temp.path(), probe.clone()));

    let barrier = Arc::new(tokio::sync::Barrier::new(4));
    let callers: Vec<_> = (0..4)
        .map(|_| {
            let library = library.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                library.get_clips(SyncMode::Full).await
            })
        })
        .collect();

    for caller in callers {
        let clips = caller.await??;
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].segments().len(), 2);
    }
    assert_eq!(probe.invocations(), 2, "racing callers must share one batch");
    Ok(())
}

#[tokio::test]
async fn test_probe_concurrency_is_bounded() -> anyhow::Result<()> {
    // 40 candidate files against the fixed 10-permit probe gate.
    let temp = TempDir::new()?;
    for minute in 0..40 {
        write_clip(
            temp.path(),
            &format!("RecentClips/2024-03-01_08-{minute:02}-00-front.mp4"),
        );
    }

    struct GaugeProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl DurationProbe for GaugeProbe {
        async fn probe(&self, _path: &Path) -> Result<f64, ProbeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(60.0)
        }
    }

    let probe = Arc::new(GaugeProbe {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let engine = SyncEngine::new(
        Arc::new(LibraryConfig::new(temp.path())),
        Arc::new(InMemoryClipIndex::new()),
        probe.clone(),
        Arc::new(CollectingReporter::default()),
    );

    let report = engine.sync(SyncMode::Incremental).await?;
    assert_eq!(report.added, 40);
    assert!(
        probe.peak.load(Ordering::SeqCst) <= 10,
        "probe gate must cap concurrent invocations at 10"
    );
    Ok(())
}
