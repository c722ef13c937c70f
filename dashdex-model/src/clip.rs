use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::files::secs_to_delta;
use crate::{Camera, ClipType, Event, VideoFileRecord};

/// One time slice of a clip: the set of per-angle files the recorder wrote
/// simultaneously at a single start timestamp.
///
/// A segment holds at most one record per camera. Its end is derived from the
/// longest probed duration among its records, so a single truncated angle
/// does not shorten the slice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipVideoSegment {
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    front: Option<Arc<VideoFileRecord>>,
    back: Option<Arc<VideoFileRecord>>,
    left_repeater: Option<Arc<VideoFileRecord>>,
    right_repeater: Option<Arc<VideoFileRecord>>,
    left_pillar: Option<Arc<VideoFileRecord>>,
    right_pillar: Option<Arc<VideoFileRecord>>,
    fisheye: Option<Arc<VideoFileRecord>>,
    narrow: Option<Arc<VideoFileRecord>>,
    cabin: Option<Arc<VideoFileRecord>>,
}

impl ClipVideoSegment {
    /// Assemble a segment from the records sharing one start timestamp.
    ///
    /// The first record seen for a camera wins its slot; later duplicates are
    /// ignored. Returns `None` when no slot gets populated or when every
    /// probed duration is zero (the segment would be empty in time).
    pub fn from_records<I>(start_date: NaiveDateTime, records: I) -> Option<Self>
    where
        I: IntoIterator<Item = Arc<VideoFileRecord>>,
    {
        let mut segment = Self {
            start_date,
            end_date: start_date,
            front: None,
            back: None,
            left_repeater: None,
            right_repeater: None,
            left_pillar: None,
            right_pillar: None,
            fisheye: None,
            narrow: None,
            cabin: None,
        };

        let mut longest_secs = 0.0_f64;
        let mut populated = false;
        for record in records {
            let slot = match segment.slot_mut(record.camera) {
                Some(slot) => slot,
                None => continue,
            };
            if slot.is_some() {
                continue;
            }
            longest_secs = longest_secs.max(record.duration_secs);
            *slot = Some(record);
            populated = true;
        }

        if !populated {
            return None;
        }

        segment.end_date = start_date + secs_to_delta(longest_secs);
        if segment.end_date <= segment.start_date {
            return None;
        }
        Some(segment)
    }

    pub fn start_date(&self) -> NaiveDateTime {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDateTime {
        self.end_date
    }

    /// The record for one camera angle, if that angle was captured.
    pub fn record(&self, camera: Camera) -> Option<&Arc<VideoFileRecord>> {
        match camera {
            Camera::Front => self.front.as_ref(),
            Camera::Back => self.back.as_ref(),
            Camera::LeftRepeater => self.left_repeater.as_ref(),
            Camera::RightRepeater => self.right_repeater.as_ref(),
            Camera::LeftPillar => self.left_pillar.as_ref(),
            Camera::RightPillar => self.right_pillar.as_ref(),
            Camera::Fisheye => self.fisheye.as_ref(),
            Camera::Narrow => self.narrow.as_ref(),
            Camera::Cabin => self.cabin.as_ref(),
            Camera::Unknown => None,
        }
    }

    fn slot_mut(&mut self, camera: Camera) -> Option<&mut Option<Arc<VideoFileRecord>>> {
        match camera {
            Camera::Front => Some(&mut self.front),
            Camera::Back => Some(&mut self.back),
            Camera::LeftRepeater => Some(&mut self.left_repeater),
            Camera::RightRepeater => Some(&mut self.right_repeater),
            Camera::LeftPillar => Some(&mut self.left_pillar),
            Camera::RightPillar => Some(&mut self.right_pillar),
            Camera::Fisheye => Some(&mut self.fisheye),
            Camera::Narrow => Some(&mut self.narrow),
            Camera::Cabin => Some(&mut self.cabin),
            Camera::Unknown => None,
        }
    }

    /// Number of camera angles captured in this slice.
    pub fn angle_count(&self) -> usize {
        Camera::SLOTS
            .iter()
            .filter(|camera| self.record(**camera).is_some())
            .count()
    }

    /// The angles captured in this slice, in slot order.
    pub fn cameras(&self) -> impl Iterator<Item = Camera> + '_ {
        Camera::SLOTS
            .into_iter()
            .filter(|camera| self.record(*camera).is_some())
    }

    pub fn duration_secs(&self) -> f64 {
        (self.end_date - self.start_date).num_milliseconds() as f64 / 1000.0
    }
}

/// A logically continuous recording composed of time-ordered segments.
///
/// Clips are views assembled from the index on demand; they are never
/// persisted and never mutated after construction. Segments are held sorted
/// ascending by start, which the timeline lookups rely on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clip {
    clip_type: ClipType,
    segments: Vec<ClipVideoSegment>,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    total_seconds: f64,
    event: Option<Event>,
    thumbnail_url: Option<String>,
}

impl Clip {
    /// Build a clip from its segments, sorting them ascending by start.
    ///
    /// Bounds and total length are derived here and nowhere else. Returns
    /// `None` for an empty segment list.
    pub fn new(
        clip_type: ClipType,
        mut segments: Vec<ClipVideoSegment>,
        event: Option<Event>,
        thumbnail_url: Option<String>,
    ) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        segments.sort_by_key(ClipVideoSegment::start_date);
        debug_assert!(
            segments
                .windows(2)
                .all(|pair| pair[0].start_date() < pair[1].start_date()),
            "clip segments must have distinct start timestamps"
        );

        let start_date = segments[0].start_date();
        let end_date = segments[segments.len() - 1].end_date();
        let total_seconds = segments.iter().map(ClipVideoSegment::duration_secs).sum();

        Some(Self {
            clip_type,
            segments,
            start_date,
            end_date,
            total_seconds,
            event,
            thumbnail_url,
        })
    }

    pub fn clip_type(&self) -> ClipType {
        self.clip_type
    }

    pub fn segments(&self) -> &[ClipVideoSegment] {
        &self.segments
    }

    pub fn start_date(&self) -> NaiveDateTime {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDateTime {
        self.end_date
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    /// The segment containing `t`, or the next segment after it.
    ///
    /// Binary-searches for the rightmost segment starting at or before `t`.
    /// If `t` falls inside it, that segment is returned; if `t` falls in a
    /// gap, the lookup snaps forward to the following segment. A `t` before
    /// the first segment returns the first segment; a `t` past the last
    /// segment's end returns `None`. O(log n).
    pub fn segment_at_or_after(&self, t: NaiveDateTime) -> Option<&ClipVideoSegment> {
        let idx = self.segments.partition_point(|s| s.start_date() <= t);
        if idx == 0 {
            return self.segments.first();
        }
        let candidate = &self.segments[idx - 1];
        if candidate.end_date() >= t {
            return Some(candidate);
        }
        self.segments.get(idx)
    }

    /// The segment whose `[start, end]` window actually contains `t`.
    ///
    /// Like [`Clip::segment_at_or_after`] but without gap-snapping: a `t`
    /// outside every segment returns `None`.
    pub fn segment_at_date(&self, t: NaiveDateTime) -> Option<&ClipVideoSegment> {
        self.segment_at_or_after(t)
            .filter(|segment| segment.start_date() <= t && t <= segment.end_date())
    }
}
