use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use dashdex_model::{Clip, ClipType, ClipVideoSegment, VideoFileRecord};
use futures::future::join_all;
use tracing::debug;

use crate::config::LibraryConfig;
use crate::events::EventMetadataCache;

/// Served when an event folder carries no usable thumbnail.
pub const DEFAULT_THUMBNAIL_URL: &str = "/static/clip-placeholder.png";

/// Assembles the flat record set into time-ordered clips.
///
/// Two independent strategies feed the result: gap-tolerant grouping of
/// rolling footage and per-folder grouping of Saved/Sentry events. Their
/// outputs are concatenated and sorted descending by clip start.
pub struct ClipBuilder {
    config: Arc<LibraryConfig>,
    events: Arc<EventMetadataCache>,
    gap_tolerance: TimeDelta,
}

impl std::fmt::Debug for ClipBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipBuilder")
            .field("gap_tolerance", &self.gap_tolerance)
            .finish_non_exhaustive()
    }
}

impl ClipBuilder {
    pub fn new(config: Arc<LibraryConfig>, events: Arc<EventMetadataCache>) -> Self {
        let gap_tolerance = TimeDelta::from_std(config.recent_gap_tolerance)
            .unwrap_or_else(|_| TimeDelta::seconds(5));
        Self {
            config,
            events,
            gap_tolerance,
        }
    }

    pub async fn build(&self, records: Vec<VideoFileRecord>) -> Vec<Clip> {
        let records: Vec<Arc<VideoFileRecord>> = records.into_iter().map(Arc::new).collect();

        let mut clips = self.build_recent_clips(&records);
        clips.extend(self.build_event_clips(&records).await);
        clips.sort_by(|a, b| b.start_date().cmp(&a.start_date()));

        debug!(clips = clips.len(), records = records.len(), "built clip set");
        clips
    }

    /// Gap-tolerant grouping of rolling footage.
    ///
    /// The recorder chunks a continuous drive into fixed-length files, so
    /// consecutive segment groups that (nearly) touch belong to one clip;
    /// a gap wider than the tolerance starts a new one.
    fn build_recent_clips(&self, records: &[Arc<VideoFileRecord>]) -> Vec<Clip> {
        let mut groups: BTreeMap<NaiveDateTime, Vec<Arc<VideoFileRecord>>> = BTreeMap::new();
        for record in records {
            if record.clip_type == ClipType::Recent {
                groups
                    .entry(record.start_date)
                    .or_default()
                    .push(record.clone());
            }
        }

        let mut clips = Vec::new();
        let mut pending: Vec<ClipVideoSegment> = Vec::new();
        for (start_date, group) in groups {
            let Some(segment) = ClipVideoSegment::from_records(start_date, group) else {
                continue;
            };
            if let Some(previous) = pending.last() {
                if segment.start_date() - previous.end_date() > self.gap_tolerance {
                    clips.extend(Clip::new(
                        ClipType::Recent,
                        std::mem::take(&mut pending),
                        None,
                        None,
                    ));
                }
            }
            pending.push(segment);
        }
        clips.extend(Clip::new(ClipType::Recent, pending, None, None));
        clips
    }

    /// One clip per Saved/Sentry event folder.
    ///
    /// Folders are independent, so their sidecar reads and assembly run
    /// concurrently.
    async fn build_event_clips(&self, records: &[Arc<VideoFileRecord>]) -> Vec<Clip> {
        let mut folders: HashMap<PathBuf, Vec<Arc<VideoFileRecord>>> = HashMap::new();
        for record in records {
            if record.event_folder.is_none() {
                continue;
            }
            let Some(folder) = record.path.parent() else {
                continue;
            };
            folders
                .entry(folder.to_path_buf())
                .or_default()
                .push(record.clone());
        }

        let builds = folders
            .into_iter()
            .map(|(folder, group)| self.build_event_clip(folder, group));
        join_all(builds).await.into_iter().flatten().collect()
    }

    async fn build_event_clip(
        &self,
        folder: PathBuf,
        records: Vec<Arc<VideoFileRecord>>,
    ) -> Option<Clip> {
        let clip_type = records.first()?.clip_type;

        let mut by_start: BTreeMap<NaiveDateTime, Vec<Arc<VideoFileRecord>>> = BTreeMap::new();
        for record in records {
            by_start
                .entry(record.start_date)
                .or_default()
                .push(record);
        }
        let segments: Vec<ClipVideoSegment> = by_start
            .into_iter()
            .filter_map(|(start, group)| ClipVideoSegment::from_records(start, group))
            .collect();

        let metadata = self.events.get_or_read(&folder).await;
        let thumbnail_url = metadata
            .thumbnail
            .as_deref()
            .and_then(|thumb| self.config.playback_url(thumb))
            .unwrap_or_else(|| DEFAULT_THUMBNAIL_URL.to_string());

        Clip::new(
            clip_type,
            segments,
            metadata.event.clone(),
            Some(thumbnail_url),
        )
    }
}
