use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Probe invocation failures. Always isolated to one file; a failed probe
/// drops that candidate from the sync cycle, never the batch.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to spawn probe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("probe timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("probe exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("unusable probe output: {0}")]
    BadOutput(String),
}

/// Reads a media file's playback duration.
///
/// Implementations spawn an external process, so invocations are expensive;
/// the sync engine bounds how many run at once.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration of the file at `path`, in seconds.
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Shells out to `ffprobe` for the container-reported duration.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl FfprobeDurationProbe {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffprobe"),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_binary<P: Into<PathBuf>>(mut self, binary: P) -> Self {
        self.binary = binary.into();
        self
    }

    /// Bound the wait on the external process. A hung probe is killed rather
    /// than allowed to stall the sync.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        debug!("Probing duration of: {}", path.display());

        let mut command = Command::new(&self.binary);
        command
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_entries",
                "format=duration",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // output() drains stdout and stderr while waiting on exit, so a
        // chatty probe cannot deadlock against a full pipe. On timeout the
        // in-flight future is dropped and kill_on_drop reaps the child.
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |code| code.to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ProbeError::BadOutput(e.to_string()))?;

        // ffprobe reports the duration as a decimal string.
        let duration = json["format"]["duration"]
            .as_str()
            .and_then(|raw| raw.parse::<f64>().ok())
            .ok_or_else(|| ProbeError::BadOutput("missing format.duration".to_string()))?;

        if !duration.is_finite() || duration <= 0.0 {
            return Err(ProbeError::BadOutput(format!(
                "non-positive duration {duration}"
            )));
        }
        Ok(duration)
    }
}
