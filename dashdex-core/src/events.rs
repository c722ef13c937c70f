use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashdex_model::Event;
use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Sidecar filename the recorder writes once per event folder.
pub const EVENT_SIDECAR_FILENAME: &str = "event.json";
/// Thumbnail filename the recorder writes next to the sidecar.
pub const EVENT_THUMBNAIL_FILENAME: &str = "thumb.png";

/// Resolved sidecar data for one event folder.
///
/// A missing or malformed sidecar degrades to `event: None`; a missing
/// thumbnail degrades to `thumbnail: None`. Neither is an error.
#[derive(Debug, Clone, Default)]
pub struct EventFolderMetadata {
    pub event: Option<Event>,
    pub thumbnail: Option<PathBuf>,
}

/// Read-once cache of event-folder sidecar metadata.
///
/// Sidecars are immutable once written, so entries never expire. Concurrent
/// requests for the same folder converge on a single read through the
/// per-folder once-cell.
#[derive(Debug, Default)]
pub struct EventMetadataCache {
    folders: DashMap<PathBuf, Arc<OnceCell<Arc<EventFolderMetadata>>>>,
}

impl EventMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_read(&self, folder: &Path) -> Arc<EventFolderMetadata> {
        let cell = self
            .folders
            .entry(folder.to_path_buf())
            .or_default()
            .clone();
        cell.get_or_init(|| async { Arc::new(Self::read_folder(folder).await) })
            .await
            .clone()
    }

    async fn read_folder(folder: &Path) -> EventFolderMetadata {
        let sidecar = folder.join(EVENT_SIDECAR_FILENAME);
        let event = match tokio::fs::read(&sidecar).await {
            Ok(bytes) => match serde_json::from_slice::<Event>(&bytes) {
                Ok(event) => Some(event),
                Err(error) => {
                    warn!(
                        folder = %folder.display(),
                        %error,
                        "malformed event sidecar"
                    );
                    None
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(folder = %folder.display(), "no event sidecar");
                None
            }
            Err(error) => {
                warn!(
                    folder = %folder.display(),
                    %error,
                    "unreadable event sidecar"
                );
                None
            }
        };

        let thumb = folder.join(EVENT_THUMBNAIL_FILENAME);
        let thumbnail = tokio::fs::try_exists(&thumb)
            .await
            .unwrap_or(false)
            .then_some(thumb);

        EventFolderMetadata { event, thumbnail }
    }
}
