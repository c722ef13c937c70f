use tracing::warn;

/// Sink for isolated per-file failures that must not abort a sync batch.
///
/// Hosts wire this to their error-tracking service; the shipped
/// implementation logs.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &(dyn std::error::Error + 'static), context: &str);
}

/// Reports through the `tracing` subscriber at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &(dyn std::error::Error + 'static), context: &str) {
        warn!(%error, context, "isolated sync failure");
    }
}
