//! Serialized resolution of discovered candidates
//!
//! Resolution is expensive and fragile on most platform backends;
//! issuing more than one request at a time risks backend-internal
//! failures. The coordinator therefore holds candidates in a FIFO queue
//! and keeps at most one resolve request in flight. The moment one
//! completes, the next is issued with no added delay.

use crate::backend::DiscoveryBackend;
use crate::events::DiscoveryEvents;
use lanscout_core::ServiceRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pending queue plus the single-flight gate.
///
/// Invariant: `resolving` is true exactly while a drain worker is alive;
/// both fields are only touched under the one mutex.
#[derive(Default)]
struct ResolveState {
    queue: VecDeque<ServiceRecord>,
    resolving: bool,
}

/// Drains discovered candidates through the backend one at a time.
#[derive(Clone)]
pub struct ResolutionCoordinator {
    backend: Arc<dyn DiscoveryBackend>,
    events: Arc<DiscoveryEvents>,
    state: Arc<Mutex<ResolveState>>,
}

impl ResolutionCoordinator {
    pub fn new(backend: Arc<dyn DiscoveryBackend>, events: Arc<DiscoveryEvents>) -> Self {
        Self {
            backend,
            events,
            state: Arc::new(Mutex::new(ResolveState::default())),
        }
    }

    /// Appends a candidate and schedules resolution work.
    ///
    /// Never blocks. Candidates are resolved strictly in arrival order;
    /// a candidate enqueued twice before its first resolution completes
    /// is resolved twice. Must be called from within a tokio runtime.
    pub fn enqueue(&self, candidate: ServiceRecord) {
        let start_worker = {
            let mut state = self.state.lock();
            state.queue.push_back(candidate);
            if state.resolving {
                false
            } else {
                state.resolving = true;
                true
            }
        };

        if start_worker {
            self.spawn_drain();
        }
    }

    /// Number of candidates still awaiting resolution.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Whether the queue is empty and no resolution is in flight.
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.queue.is_empty() && !state.resolving
    }

    /// Runs the drain loop until the queue empties.
    ///
    /// The worker is the sole holder of the gate: it pops one candidate
    /// per iteration, awaits the backend, and exits after clearing the
    /// gate when nothing is left. Completion of one resolution is the
    /// only trigger that starts the next.
    fn spawn_drain(&self) {
        let backend = Arc::clone(&self.backend);
        let events = Arc::clone(&self.events);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            loop {
                let candidate = {
                    let mut state = state.lock();
                    match state.queue.pop_front() {
                        Some(candidate) => candidate,
                        None => {
                            state.resolving = false;
                            break;
                        }
                    }
                };

                debug!(service = %candidate.key(), "resolving service");
                match backend.resolve(&candidate).await {
                    Ok(record) => {
                        debug!(
                            service = %record.key(),
                            endpoint = %record.endpoint().unwrap_or_default(),
                            "service resolved"
                        );
                        events.resolved.emit(record);
                    }
                    Err(e) => {
                        // Dropped, not retried: discovery re-reports the
                        // candidate if it is still reachable.
                        warn!(service = %candidate.key(), error = %e, "service resolution failed");
                    }
                }
            }
        });
    }
}
