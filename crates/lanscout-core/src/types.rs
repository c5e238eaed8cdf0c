//! Types for discovered services and their metadata

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A service on the local network, as reported by discovery.
///
/// Before resolution a record carries only its identity (`name`,
/// `service_type`, `domain`); `host` is empty and `port` is `0`. A record
/// emitted on the *resolved* stream always has a non-empty `host` and a
/// non-zero `port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Service instance name (e.g. "printer1"). Never absent; an unknown
    /// name is the empty string.
    #[serde(default)]
    pub name: String,

    /// Registration type (e.g. "_http._tcp")
    pub service_type: String,

    /// Discovery domain, usually "local."
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Textual resolved address; empty while unresolved
    #[serde(default)]
    pub host: String,

    /// Resolved port; 0 while unresolved
    #[serde(default)]
    pub port: u16,

    /// TXT record attributes (key-value metadata)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl ServiceRecord {
    /// Creates an unresolved candidate record.
    pub fn candidate(
        name: impl Into<String>,
        service_type: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service_type: service_type.into(),
            domain: domain.into(),
            host: String::new(),
            port: 0,
            attributes: HashMap::new(),
        }
    }

    /// Stable identity of this service: name + type + domain.
    ///
    /// Two sightings of the same service instance produce the same key
    /// regardless of resolution state.
    pub fn key(&self) -> String {
        format!(
            "{}.{}.{}",
            self.name,
            self.service_type.trim_end_matches('.'),
            self.domain.trim_end_matches('.')
        )
    }

    /// Whether resolution has populated a usable endpoint.
    pub fn is_resolved(&self) -> bool {
        !self.host.is_empty() && self.port > 0
    }

    /// Returns the connection endpoint (host:port) once resolved.
    pub fn endpoint(&self) -> Option<String> {
        if self.is_resolved() {
            Some(format!("{}:{}", self.host, self.port))
        } else {
            None
        }
    }

    /// Looks up a TXT attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|s| s.as_str())
    }
}

fn default_domain() -> String {
    "local.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_is_unresolved() {
        let record = ServiceRecord::candidate("printer1", "_http._tcp", "local.");
        assert_eq!(record.name, "printer1");
        assert_eq!(record.host, "");
        assert_eq!(record.port, 0);
        assert!(!record.is_resolved());
        assert_eq!(record.endpoint(), None);
    }

    #[test]
    fn test_key_is_stable_across_resolution() {
        let candidate = ServiceRecord::candidate("printer1", "_http._tcp", "local.");
        let mut resolved = candidate.clone();
        resolved.host = "192.168.1.5".to_string();
        resolved.port = 8080;

        assert_eq!(candidate.key(), resolved.key());
        assert_eq!(candidate.key(), "printer1._http._tcp.local");
    }

    #[test]
    fn test_endpoint_when_resolved() {
        let mut record = ServiceRecord::candidate("nas", "_smb._tcp", "local.");
        record.host = "192.168.1.42".to_string();
        record.port = 445;

        assert!(record.is_resolved());
        assert_eq!(record.endpoint().as_deref(), Some("192.168.1.42:445"));
    }

    #[test]
    fn test_attribute_lookup() {
        let mut record = ServiceRecord::candidate("printer1", "_ipp._tcp", "local.");
        record
            .attributes
            .insert("rp".to_string(), "ipp/print".to_string());

        assert_eq!(record.attribute("rp"), Some("ipp/print"));
        assert_eq!(record.attribute("missing"), None);
    }

    #[test]
    fn test_deserialize_fills_unresolved_defaults() {
        let record: ServiceRecord =
            serde_json::from_str(r#"{"name":"printer1","service_type":"_http._tcp"}"#).unwrap();

        assert_eq!(record.domain, "local.");
        assert_eq!(record.host, "");
        assert_eq!(record.port, 0);
        assert!(record.attributes.is_empty());
    }
}
