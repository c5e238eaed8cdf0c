//! Discovery session lifecycle and backend event fan-out

use crate::backend::{BackendEvent, DiscoveryBackend, SessionHandle};
use crate::error::{DiscoveryError, Result};
use crate::events::DiscoveryEvents;
use crate::resolver::ResolutionCoordinator;
use async_channel::Receiver;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

struct ActiveSession {
    epoch: u64,
    service_type: String,
    handle: SessionHandle,
}

/// Owns the single active discovery session and wires backend events
/// into the resolution queue and the consumer streams.
///
/// All entry points return immediately; discovery-running status and
/// service sightings arrive asynchronously on the event streams. The
/// controller is reusable: any error leaves it in a callable state.
pub struct DiscoveryController {
    backend: Arc<dyn DiscoveryBackend>,
    events: Arc<DiscoveryEvents>,
    resolver: ResolutionCoordinator,
    session: Mutex<Option<ActiveSession>>,
    /// Bumped on every start; session tasks compare against it so a
    /// superseded session's late events produce no emissions.
    epoch: Arc<AtomicU64>,
}

impl DiscoveryController {
    pub fn new(backend: Arc<dyn DiscoveryBackend>) -> Self {
        let events = Arc::new(DiscoveryEvents::new());
        let resolver = ResolutionCoordinator::new(Arc::clone(&backend), Arc::clone(&events));

        Self {
            backend,
            events,
            resolver,
            session: Mutex::new(None),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The consumer-facing notification streams.
    pub fn events(&self) -> &DiscoveryEvents {
        &self.events
    }

    /// Whether a discovery session is currently held.
    pub fn is_active(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Service type of the active session, if any.
    pub fn active_service_type(&self) -> Option<String> {
        self.session.lock().as_ref().map(|s| s.service_type.clone())
    }

    /// Begins browsing for `service_type`.
    ///
    /// If a session is already active it is stopped first; the new
    /// session takes over without waiting for the backend to confirm the
    /// stop. Running-state is reported asynchronously on the `running`
    /// stream. Must be called from within a tokio runtime.
    pub fn start_discovery(&self, service_type: &str) -> Result<()> {
        if service_type.is_empty() {
            return Err(DiscoveryError::InvalidServiceType(service_type.to_string()));
        }

        let mut session = self.session.lock();
        if let Some(previous) = session.take() {
            debug!(
                service_type = %previous.service_type,
                "stopping superseded discovery session"
            );
            self.backend.stop_discovery(&previous.handle);
        }

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = async_channel::unbounded();
        let handle = self.backend.start_discovery(service_type, tx);

        info!(service_type, "discovery requested");
        *session = Some(ActiveSession {
            epoch,
            service_type: service_type.to_string(),
            handle,
        });
        drop(session);

        self.spawn_session_task(epoch, rx);
        Ok(())
    }

    /// Stops the active discovery session.
    ///
    /// The local handle is cleared immediately; if the backend stop later
    /// fails that is reported as `running = true` on the running stream
    /// and the backend may keep a dangling session (best effort).
    pub fn stop_discovery(&self) -> Result<()> {
        let previous = self
            .session
            .lock()
            .take()
            .ok_or(DiscoveryError::NotRunning)?;

        info!(service_type = %previous.service_type, "discovery stop requested");
        self.backend.stop_discovery(&previous.handle);
        Ok(())
    }

    /// Relays one session's backend events for as long as that session
    /// is current.
    fn spawn_session_task(&self, epoch: u64, rx: Receiver<BackendEvent>) {
        let events = Arc::clone(&self.events);
        let resolver = self.resolver.clone();
        let current = Arc::clone(&self.epoch);

        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if current.load(Ordering::SeqCst) != epoch {
                    debug!(epoch, "discarding event from superseded discovery session");
                    break;
                }

                match event {
                    BackendEvent::DiscoveryStarted => {
                        debug!("discovery running");
                        events.running.emit(true);
                    }
                    BackendEvent::DiscoveryStopped => {
                        debug!("discovery stopped");
                        events.running.emit(false);
                    }
                    BackendEvent::StartFailed { reason } => {
                        error!(%reason, "backend failed to start discovery");
                        events.running.emit(false);
                    }
                    BackendEvent::StopFailed { reason } => {
                        // Best effort: the session did not actually stop.
                        error!(%reason, "backend failed to stop discovery");
                        events.running.emit(true);
                    }
                    BackendEvent::ServiceFound(candidate) => {
                        debug!(service = %candidate.key(), "service found");
                        events.discovered.emit(candidate.clone());
                        resolver.enqueue(candidate);
                    }
                    BackendEvent::ServiceLost(record) => {
                        // Loss needs no resolution; bypasses the queue.
                        debug!(service = %record.key(), "service lost");
                        events.lost.emit(record);
                    }
                }
            }
        });
    }
}

impl Drop for DiscoveryController {
    fn drop(&mut self) {
        if let Some(session) = self.session.lock().take() {
            warn!(
                service_type = %session.service_type,
                "controller dropped with an active discovery session"
            );
            self.backend.stop_discovery(&session.handle);
        }
    }
}
