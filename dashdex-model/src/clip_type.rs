use std::fmt;

/// The kind of footage a record belongs to, derived from its top-level
/// folder on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub enum ClipType {
    /// Rolling dashcam footage under `RecentClips`.
    Recent,
    /// User-saved events under `SavedClips`.
    Saved,
    /// Security-triggered events under `SentryClips`.
    Sentry,
    /// Sentinel for records whose kind could not be determined.
    Unknown,
}

impl ClipType {
    /// Map a top-level folder name to its clip type. Exact match only.
    pub fn from_folder(name: &str) -> Option<Self> {
        match name {
            "RecentClips" => Some(ClipType::Recent),
            "SavedClips" => Some(ClipType::Saved),
            "SentryClips" => Some(ClipType::Sentry),
            _ => None,
        }
    }

    /// The on-disk folder name for this clip type.
    pub fn folder(&self) -> Option<&'static str> {
        match self {
            ClipType::Recent => Some("RecentClips"),
            ClipType::Saved => Some("SavedClips"),
            ClipType::Sentry => Some("SentryClips"),
            ClipType::Unknown => None,
        }
    }

    /// Whether files of this type live inside timestamp-named event folders.
    pub fn is_event_kind(&self) -> bool {
        matches!(self, ClipType::Saved | ClipType::Sentry)
    }
}

impl fmt::Display for ClipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipType::Recent => write!(f, "Recent"),
            ClipType::Saved => write!(f, "Saved"),
            ClipType::Sentry => write!(f, "Sentry"),
            ClipType::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_mapping() {
        assert_eq!(ClipType::from_folder("RecentClips"), Some(ClipType::Recent));
        assert_eq!(ClipType::from_folder("SavedClips"), Some(ClipType::Saved));
        assert_eq!(ClipType::from_folder("SentryClips"), Some(ClipType::Sentry));
        assert_eq!(ClipType::from_folder("recentclips"), None);
        assert_eq!(ClipType::from_folder("Clips"), None);
    }

    #[test]
    fn test_event_kinds() {
        assert!(!ClipType::Recent.is_event_kind());
        assert!(ClipType::Saved.is_event_kind());
        assert!(ClipType::Sentry.is_event_kind());
    }
}
