use std::path::PathBuf;

use chrono::{NaiveDateTime, TimeDelta};

use crate::{Camera, ClipType};

/// A single indexed video file discovered on disk.
///
/// The absolute path is the record's unique key. Records are created when the
/// sync engine discovers and probes a new file and deleted when the file
/// disappears; they are never mutated in place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoFileRecord {
    pub path: PathBuf,
    /// URL the playback layer serves this file under.
    pub url: String,
    pub clip_type: ClipType,
    /// Timestamp-named event folder for Saved/Sentry footage.
    pub event_folder: Option<String>,
    pub camera: Camera,
    /// Recorder-local wall-clock start, parsed from the filename.
    pub start_date: NaiveDateTime,
    /// Playback duration in seconds, reported by the external probe.
    pub duration_secs: f64,
}

impl VideoFileRecord {
    pub fn end_date(&self) -> NaiveDateTime {
        self.start_date + secs_to_delta(self.duration_secs)
    }
}

/// Convert probed seconds to a chrono delta at millisecond resolution.
pub(crate) fn secs_to_delta(secs: f64) -> TimeDelta {
    TimeDelta::milliseconds((secs * 1000.0).round() as i64)
}
