use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{DashdexError, Result};

/// Recursive enumeration of candidate footage files under the card root.
///
/// The scanner only gathers paths; classification happens in the parser and
/// anything the parser rejects is silently dropped downstream.
#[derive(Debug, Clone)]
pub struct ClipScanner {
    /// Expected media file extension, compared case-insensitively.
    extension: String,
}

impl ClipScanner {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn is_media_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    /// Enumerate media files under `root`.
    ///
    /// An unavailable root aborts the scan; unreadable entries deeper in the
    /// tree are logged and skipped.
    pub fn scan_root(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(DashdexError::RootUnavailable(format!(
                "directory does not exist: {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(DashdexError::RootUnavailable(format!(
                "path is not a directory: {}",
                root.display()
            )));
        }

        debug!("Starting footage scan of: {}", root.display());

        let mut files = Vec::new();
        let mut skipped = 0_usize;
        for entry in WalkDir::new(root).follow_links(false) {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if self.is_media_file(entry.path()) {
                        files.push(entry.into_path());
                    } else {
                        skipped += 1;
                    }
                }
                Err(err) if err.depth() == 0 => {
                    // The root itself could not be read.
                    return Err(DashdexError::RootUnavailable(format!(
                        "{}: {err}",
                        root.display()
                    )));
                }
                Err(err) => {
                    warn!("Error walking footage tree: {err}");
                }
            }
        }

        info!(
            "Scan complete: {} media files, {} other files skipped",
            files.len(),
            skipped
        );
        Ok(files)
    }
}
