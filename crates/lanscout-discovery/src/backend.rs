//! The seam between the coordinator and the platform discovery primitive

use crate::error::Result;
use async_channel::Sender;
use async_trait::async_trait;
use lanscout_core::ServiceRecord;

/// Opaque handle for one active browse session.
///
/// Minted by [`DiscoveryBackend::start_discovery`] and passed back to
/// [`DiscoveryBackend::stop_discovery`]. The coordinator never inspects
/// the token beyond equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Asynchronous notifications a backend delivers for one session.
///
/// Start and stop outcomes arrive here rather than as return values:
/// the platform primitives this trait models (NsdManager, mdns daemons)
/// acknowledge those requests asynchronously.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    /// Browsing is confirmed active
    DiscoveryStarted,

    /// Browsing is confirmed stopped
    DiscoveryStopped,

    /// The start request failed; browsing never became active
    StartFailed { reason: String },

    /// The stop request failed; browsing is presumed still active
    StopFailed { reason: String },

    /// A service instance appeared (unresolved candidate)
    ServiceFound(ServiceRecord),

    /// A service instance disappeared
    ServiceLost(ServiceRecord),
}

/// Platform discovery/resolution primitive.
///
/// Implementations own all network I/O. `start_discovery` and
/// `stop_discovery` are fire-and-forget: they return immediately and
/// report their outcome through the session's event channel. `resolve`
/// is the one expensive operation; the coordinator guarantees it is
/// never called concurrently with itself.
#[async_trait]
pub trait DiscoveryBackend: Send + Sync + 'static {
    /// Begins browsing for `service_type`, delivering events on `events`.
    fn start_discovery(&self, service_type: &str, events: Sender<BackendEvent>) -> SessionHandle;

    /// Requests that the given browse session stop.
    fn stop_discovery(&self, session: &SessionHandle);

    /// Resolves a candidate into a record with host, port and attributes.
    async fn resolve(&self, candidate: &ServiceRecord) -> Result<ServiceRecord>;
}
