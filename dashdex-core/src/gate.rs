use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};

/// Bounded resource gate: at most `capacity` holders at a time.
///
/// One abstraction covers both serialization points in the pipeline: the
/// probe gate runs at capacity 10 to bound external process spawning, and
/// the sync gate wraps a capacity-1 instance for single-flight.
#[derive(Debug)]
pub struct ResourceGate {
    permits: Semaphore,
}

impl ResourceGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Semaphore::new(capacity),
        }
    }

    pub async fn acquire(&self) -> SemaphorePermit<'_> {
        // The semaphore is never closed for the life of the gate.
        self.permits.acquire().await.expect("gate semaphore closed")
    }
}

/// Process-wide single-flight gate for sync runs.
///
/// The generation counter lets a caller that waited behind another sync tell
/// that the work already happened: it records the generation before queueing
/// and compares after acquiring. A bump in between means the index is
/// already current and the caller should coalesce instead of re-scanning.
#[derive(Debug)]
pub struct SyncGate {
    gate: ResourceGate,
    generation: AtomicU64,
}

impl Default for SyncGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncGate {
    pub fn new() -> Self {
        Self {
            gate: ResourceGate::new(1),
            generation: AtomicU64::new(0),
        }
    }

    /// Wait for exclusive sync ownership.
    pub async fn enter(&self) -> SyncTicket<'_> {
        let observed = self.generation.load(Ordering::Acquire);
        let permit = self.gate.acquire().await;
        SyncTicket {
            gate: self,
            _permit: permit,
            observed,
        }
    }
}

/// Exclusive ownership of the sync critical section.
#[derive(Debug)]
pub struct SyncTicket<'a> {
    gate: &'a SyncGate,
    _permit: SemaphorePermit<'a>,
    observed: u64,
}

impl SyncTicket<'_> {
    /// True when another caller's sync completed while this one waited.
    pub fn coalesced(&self) -> bool {
        self.gate.generation.load(Ordering::Acquire) != self.observed
    }

    /// Publish this ticket's sync as complete. Not called on failure, so a
    /// waiter behind a failed run retries rather than trusting a bad index.
    pub fn complete(&self) {
        self.gate.generation.fetch_add(1, Ordering::AcqRel);
    }
}
