use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for one indexed footage tree.
///
/// Hosts embed this in their own config files; every field has a sensible
/// default except the root, which points at the directory holding the
/// `RecentClips` / `SavedClips` / `SentryClips` folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory containing the top-level clip folders.
    pub root: PathBuf,
    /// URL prefix the playback layer serves footage files under.
    pub playback_url_prefix: String,
    /// Expected media file extension.
    pub video_extension: String,
    /// Probe executable invoked to read durations.
    pub probe_binary: PathBuf,
    /// Upper bound on a single probe invocation.
    pub probe_timeout: Duration,
    /// Cap on concurrently running probe processes.
    pub probe_concurrency: usize,
    /// Largest gap between consecutive recent segments that still reads as
    /// one continuous recording.
    pub recent_gap_tolerance: Duration,
    /// Sliding expiration for the built clip array.
    pub clip_cache_ttl: Duration,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            playback_url_prefix: "/videos".to_string(),
            video_extension: "mp4".to_string(),
            probe_binary: PathBuf::from("ffprobe"),
            probe_timeout: Duration::from_secs(15),
            probe_concurrency: 10,
            recent_gap_tolerance: Duration::from_secs(5),
            clip_cache_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl LibraryConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_playback_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.playback_url_prefix = prefix.into();
        self
    }

    pub fn with_probe_binary<P: Into<PathBuf>>(mut self, binary: P) -> Self {
        self.probe_binary = binary.into();
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_probe_concurrency(mut self, concurrency: usize) -> Self {
        self.probe_concurrency = concurrency;
        self
    }

    pub fn with_recent_gap_tolerance(mut self, tolerance: Duration) -> Self {
        self.recent_gap_tolerance = tolerance;
        self
    }

    pub fn with_clip_cache_ttl(mut self, ttl: Duration) -> Self {
        self.clip_cache_ttl = ttl;
        self
    }

    /// Map an on-disk path under the root to its playback URL.
    ///
    /// `None` for paths outside the root or with non-UTF-8 components.
    pub fn playback_url(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut url = self.playback_url_prefix.trim_end_matches('/').to_string();
        for component in relative.components() {
            url.push('/');
            url.push_str(component.as_os_str().to_str()?);
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LibraryConfig::default();
        assert_eq!(config.probe_concurrency, 10);
        assert_eq!(config.recent_gap_tolerance, Duration::from_secs(5));
        assert_eq!(config.clip_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.video_extension, "mp4");
    }

    #[test]
    fn test_playback_url_mapping() {
        let config = LibraryConfig::new("/footage").with_playback_url_prefix("/videos/");
        let url = config.playback_url(Path::new(
            "/footage/SentryClips/2024-03-01_08-15-30/2024-03-01_08-15-30-front.mp4",
        ));
        assert_eq!(
            url.as_deref(),
            Some("/videos/SentryClips/2024-03-01_08-15-30/2024-03-01_08-15-30-front.mp4")
        );
    }

    #[test]
    fn test_playback_url_outside_root() {
        let config = LibraryConfig::new("/footage");
        assert_eq!(config.playback_url(Path::new("/elsewhere/a.mp4")), None);
    }
}
