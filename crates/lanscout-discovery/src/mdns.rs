//! mDNS backend built on the `mdns-sd` service daemon

use crate::backend::{BackendEvent, DiscoveryBackend, SessionHandle};
use crate::error::{DiscoveryError, Result};
use async_channel::Sender;
use async_trait::async_trait;
use dashmap::DashMap;
use lanscout_core::{DiscoveryConfig, ServiceRecord};
use mdns_sd::{ServiceDaemon, ServiceEvent as MdnsEvent, ServiceInfo};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};
use uuid::Uuid;

struct BrowseSession {
    browse_type: String,
    events: Sender<BackendEvent>,
}

/// `DiscoveryBackend` implementation backed by an mDNS daemon.
///
/// Browsing translates daemon events into [`BackendEvent`]s. The daemon
/// resolves services on its own schedule; resolved infos land in a cache
/// keyed by service identity, and `resolve()` either answers from that
/// cache or waits (bounded by [`DiscoveryConfig::resolve_timeout`]) for
/// the daemon to deliver the missing info.
pub struct MdnsBackend {
    daemon: ServiceDaemon,
    config: DiscoveryConfig,
    sessions: DashMap<String, BrowseSession>,
    resolved: Arc<DashMap<String, ServiceRecord>>,
    waiters: Arc<DashMap<String, oneshot::Sender<ServiceRecord>>>,
}

impl MdnsBackend {
    /// Creates the backend and its daemon.
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        config.validate().map_err(DiscoveryError::InvalidConfig)?;

        let daemon = ServiceDaemon::new()
            .map_err(|e| DiscoveryError::BackendInit(format!("mDNS daemon: {}", e)))?;

        Ok(Self {
            daemon,
            config,
            sessions: DashMap::new(),
            resolved: Arc::new(DashMap::new()),
            waiters: Arc::new(DashMap::new()),
        })
    }

    /// Fully qualified browse string for a service type, e.g.
    /// `_http._tcp` + `local.` -> `_http._tcp.local.`
    fn browse_type(&self, service_type: &str) -> String {
        let ty = service_type.trim_end_matches('.');
        let domain = self.config.domain.trim_end_matches('.');
        if ty.ends_with(&format!(".{}", domain)) {
            format!("{}.", ty)
        } else {
            format!("{}.{}.", ty, domain)
        }
    }
}

#[async_trait]
impl DiscoveryBackend for MdnsBackend {
    fn start_discovery(&self, service_type: &str, events: Sender<BackendEvent>) -> SessionHandle {
        let token = Uuid::new_v4().to_string();
        let browse_type = self.browse_type(service_type);

        match self.daemon.browse(&browse_type) {
            Ok(receiver) => {
                let translator = Translator {
                    events: events.clone(),
                    resolved: Arc::clone(&self.resolved),
                    waiters: Arc::clone(&self.waiters),
                    service_type: service_type.to_string(),
                    domain: self.config.domain.clone(),
                    browse_type: browse_type.clone(),
                };

                tokio::spawn(async move {
                    loop {
                        match receiver.recv_async().await {
                            Ok(event) => {
                                if !translator.handle(event).await {
                                    break;
                                }
                            }
                            Err(_) => {
                                // Daemon shut down or browse was stopped.
                                debug!(
                                    browse_type = %translator.browse_type,
                                    "mDNS browse channel closed"
                                );
                                break;
                            }
                        }
                    }
                });
            }
            Err(e) => {
                error!(browse_type = %browse_type, error = %e, "mDNS browse failed to start");
                let _ = events.try_send(BackendEvent::StartFailed {
                    reason: e.to_string(),
                });
            }
        }

        self.sessions.insert(
            token.clone(),
            BrowseSession {
                browse_type,
                events,
            },
        );
        SessionHandle::new(token)
    }

    fn stop_discovery(&self, session: &SessionHandle) {
        let Some((_, browse)) = self.sessions.remove(session.token()) else {
            warn!(token = session.token(), "stop requested for unknown session");
            return;
        };

        if let Err(e) = self.daemon.stop_browse(&browse.browse_type) {
            error!(browse_type = %browse.browse_type, error = %e, "mDNS stop_browse failed");
            let _ = browse.events.try_send(BackendEvent::StopFailed {
                reason: e.to_string(),
            });
        }
    }

    async fn resolve(&self, candidate: &ServiceRecord) -> Result<ServiceRecord> {
        let key = candidate.key();

        if let Some(record) = self.resolved.get(&key) {
            return Ok(record.value().clone());
        }

        let (tx, rx) = oneshot::channel();
        self.waiters.insert(key.clone(), tx);

        // The daemon may have delivered the info between the cache check
        // and the waiter registration.
        if let Some(record) = self.resolved.get(&key) {
            self.waiters.remove(&key);
            return Ok(record.value().clone());
        }

        let result = tokio::time::timeout(self.config.resolve_timeout(), rx).await;
        self.waiters.remove(&key);

        match result {
            Ok(Ok(record)) => Ok(record),
            Ok(Err(_)) => Err(DiscoveryError::resolve_failed(key, "backend shut down")),
            Err(_) => Err(DiscoveryError::resolve_failed(
                key,
                format!(
                    "no resolution within {}s",
                    self.config.resolve_timeout_secs
                ),
            )),
        }
    }
}

impl Drop for MdnsBackend {
    fn drop(&mut self) {
        let _ = self.daemon.shutdown();
    }
}

/// Per-session state for turning daemon events into backend events.
struct Translator {
    events: Sender<BackendEvent>,
    resolved: Arc<DashMap<String, ServiceRecord>>,
    waiters: Arc<DashMap<String, oneshot::Sender<ServiceRecord>>>,
    service_type: String,
    domain: String,
    browse_type: String,
}

impl Translator {
    /// Handles one daemon event; returns false when the session is over
    /// or the consumer is gone.
    async fn handle(&self, event: MdnsEvent) -> bool {
        match event {
            MdnsEvent::SearchStarted(ty) => {
                debug!(browse_type = %ty, "mDNS search started");
                self.send(BackendEvent::DiscoveryStarted).await
            }
            MdnsEvent::SearchStopped(ty) => {
                debug!(browse_type = %ty, "mDNS search stopped");
                let _ = self.send(BackendEvent::DiscoveryStopped).await;
                false
            }
            MdnsEvent::ServiceFound(_ty, fullname) => {
                let candidate = ServiceRecord::candidate(
                    instance_name(&fullname, &self.browse_type),
                    &self.service_type,
                    &self.domain,
                );
                self.send(BackendEvent::ServiceFound(candidate)).await
            }
            MdnsEvent::ServiceResolved(info) => {
                let record = self.record_from_info(&info);
                debug!(
                    service = %record.key(),
                    endpoint = %record.endpoint().unwrap_or_default(),
                    "mDNS resolved"
                );
                if let Some((_, waiter)) = self.waiters.remove(&record.key()) {
                    let _ = waiter.send(record.clone());
                }
                self.resolved.insert(record.key(), record);
                true
            }
            MdnsEvent::ServiceRemoved(_ty, fullname) => {
                let name = instance_name(&fullname, &self.browse_type);
                let candidate = ServiceRecord::candidate(name, &self.service_type, &self.domain);
                // Report the last resolved state when we have it.
                let record = self
                    .resolved
                    .remove(&candidate.key())
                    .map(|(_, record)| record)
                    .unwrap_or(candidate);
                self.send(BackendEvent::ServiceLost(record)).await
            }
            _ => true,
        }
    }

    async fn send(&self, event: BackendEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    fn record_from_info(&self, info: &ServiceInfo) -> ServiceRecord {
        // Prefer an IPv4 address, then any address, then the hostname.
        let host = info
            .get_addresses()
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| info.get_addresses().iter().next())
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| info.get_hostname().trim_end_matches('.').to_string());

        let mut attributes = HashMap::new();
        for prop in info.get_properties().iter() {
            attributes.insert(prop.key().to_string(), prop.val_str().to_string());
        }

        ServiceRecord {
            name: instance_name(info.get_fullname(), &self.browse_type),
            service_type: self.service_type.clone(),
            domain: self.domain.clone(),
            host,
            port: info.get_port(),
            attributes,
        }
    }
}

/// Extracts the instance name from a fully qualified service name,
/// e.g. `printer1._http._tcp.local.` -> `printer1`.
fn instance_name(fullname: &str, browse_type: &str) -> String {
    fullname
        .strip_suffix(browse_type)
        .map(|s| s.trim_end_matches('.'))
        .unwrap_or(fullname)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_name_extraction() {
        assert_eq!(
            instance_name("printer1._http._tcp.local.", "_http._tcp.local."),
            "printer1"
        );
        assert_eq!(
            instance_name("oddball", "_http._tcp.local."),
            "oddball"
        );
    }

    #[test]
    fn test_browse_type_qualification() {
        let backend = MdnsBackend::new(DiscoveryConfig::default());
        // Daemon creation can fail in constrained environments; the
        // qualification rule is what matters here.
        if let Ok(backend) = backend {
            assert_eq!(backend.browse_type("_http._tcp"), "_http._tcp.local.");
            assert_eq!(backend.browse_type("_http._tcp."), "_http._tcp.local.");
            assert_eq!(backend.browse_type("_http._tcp.local."), "_http._tcp.local.");
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DiscoveryConfig {
            resolve_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            MdnsBackend::new(config),
            Err(DiscoveryError::InvalidConfig(_))
        ));
    }
}
