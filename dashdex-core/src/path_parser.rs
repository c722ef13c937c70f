use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use dashdex_model::{Camera, ClipType};

/// Filename/path parsing for the recorder's on-card layout.
///
/// Two shapes are accepted, validated structurally:
///
/// - `RecentClips/<timestamp>-<camera>.mp4`
/// - `SavedClips/<event-timestamp>/<timestamp>-<camera>.mp4` (likewise
///   `SentryClips`), where the parent folder name must itself be a valid
///   timestamp token.
///
/// Timestamp tokens are fixed-width `YYYY-MM-DD_HH-MM-SS`. Fields are pulled
/// out by offset with explicit digit and calendar checks; there is no pattern
/// engine and no backtracking, so hostile input costs the same as valid
/// input. Anything that fails a check is a clean no-match.
pub struct ClipPathParser;

/// Metadata extracted from one accepted path.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClipPath {
    pub clip_type: ClipType,
    pub event_folder: Option<String>,
    pub camera: Camera,
    pub timestamp: NaiveDateTime,
}

impl ClipPathParser {
    /// Fixed width of a timestamp token.
    const TIMESTAMP_LEN: usize = 19;

    /// Parse a candidate file path. Walks at most two directory levels up
    /// from the file; never panics on malformed input.
    pub fn parse(path: &Path, extension: &str) -> Option<ParsedClipPath> {
        let file_name = path.file_name()?.to_str()?;
        let (stem, ext) = file_name.rsplit_once('.')?;
        if !ext.eq_ignore_ascii_case(extension) {
            return None;
        }

        // "<timestamp>-<camera>"
        if stem.len() <= Self::TIMESTAMP_LEN || !stem.is_char_boundary(Self::TIMESTAMP_LEN) {
            return None;
        }
        let (ts_token, rest) = stem.split_at(Self::TIMESTAMP_LEN);
        let timestamp = Self::parse_timestamp(ts_token)?;
        let camera = Camera::from_token(rest.strip_prefix('-')?)?;

        let parent = path.parent()?;
        let parent_name = parent.file_name()?.to_str()?;

        // Shape 1: file sits directly under a kind folder. Only rolling
        // footage lives there; Saved/Sentry files outside an event folder
        // are not valid.
        if let Some(clip_type) = ClipType::from_folder(parent_name) {
            if clip_type != ClipType::Recent {
                return None;
            }
            return Some(ParsedClipPath {
                clip_type,
                event_folder: None,
                camera,
                timestamp,
            });
        }

        // Shape 2: file sits in a timestamp-named event folder whose parent
        // is a Saved/Sentry kind folder.
        Self::parse_timestamp(parent_name)?;
        let grandparent = parent.parent()?;
        let clip_type = ClipType::from_folder(grandparent.file_name()?.to_str()?)?;
        if !clip_type.is_event_kind() {
            return None;
        }
        Some(ParsedClipPath {
            clip_type,
            event_folder: Some(parent_name.to_string()),
            camera,
            timestamp,
        })
    }

    /// Validate a fixed-width `YYYY-MM-DD_HH-MM-SS` token field-by-field.
    ///
    /// Calendar construction rejects impossible dates (month 13, Feb 30);
    /// time construction rejects out-of-range clock fields.
    pub fn parse_timestamp(token: &str) -> Option<NaiveDateTime> {
        let bytes = token.as_bytes();
        if bytes.len() != Self::TIMESTAMP_LEN {
            return None;
        }
        if bytes[4] != b'-'
            || bytes[7] != b'-'
            || bytes[10] != b'_'
            || bytes[13] != b'-'
            || bytes[16] != b'-'
        {
            return None;
        }

        let year = decimal_field(&bytes[0..4])?;
        let month = decimal_field(&bytes[5..7])?;
        let day = decimal_field(&bytes[8..10])?;
        let hour = decimal_field(&bytes[11..13])?;
        let minute = decimal_field(&bytes[14..16])?;
        let second = decimal_field(&bytes[17..19])?;

        NaiveDate::from_ymd_opt(year as i32, month, day)?.and_hms_opt(hour, minute, second)
    }
}

/// Parse an all-digit big-endian decimal field.
fn decimal_field(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, &b| {
        if b.is_ascii_digit() {
            Some(acc * 10 + u32::from(b - b'0'))
        } else {
            None
        }
    })
}
