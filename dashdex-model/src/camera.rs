use std::fmt;

/// A fixed camera angle on the vehicle.
///
/// The recorder names each file after the angle that produced it; the token
/// is the part of the filename that follows the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Camera {
    Front,
    Back,
    LeftRepeater,
    RightRepeater,
    LeftPillar,
    RightPillar,
    Fisheye,
    Narrow,
    Cabin,
    /// Sentinel for records whose angle could not be determined.
    Unknown,
}

impl Camera {
    /// Every angle that can occupy a segment slot, in slot order.
    pub const SLOTS: [Camera; 9] = [
        Camera::Front,
        Camera::Back,
        Camera::LeftRepeater,
        Camera::RightRepeater,
        Camera::LeftPillar,
        Camera::RightPillar,
        Camera::Fisheye,
        Camera::Narrow,
        Camera::Cabin,
    ];

    /// Parse the filename token following the timestamp, e.g. `left_repeater`.
    ///
    /// Unrecognized tokens are a parse failure, not `Unknown` — the sentinel
    /// is reserved for records that reach the index through other means.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "front" => Some(Camera::Front),
            "back" => Some(Camera::Back),
            "left_repeater" => Some(Camera::LeftRepeater),
            "right_repeater" => Some(Camera::RightRepeater),
            "left_pillar" => Some(Camera::LeftPillar),
            "right_pillar" => Some(Camera::RightPillar),
            "fisheye" => Some(Camera::Fisheye),
            "narrow" => Some(Camera::Narrow),
            "cabin" => Some(Camera::Cabin),
            _ => None,
        }
    }

    /// The canonical filename token for this angle.
    pub fn token(&self) -> &'static str {
        match self {
            Camera::Front => "front",
            Camera::Back => "back",
            Camera::LeftRepeater => "left_repeater",
            Camera::RightRepeater => "right_repeater",
            Camera::LeftPillar => "left_pillar",
            Camera::RightPillar => "right_pillar",
            Camera::Fisheye => "fisheye",
            Camera::Narrow => "narrow",
            Camera::Cabin => "cabin",
            Camera::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}
