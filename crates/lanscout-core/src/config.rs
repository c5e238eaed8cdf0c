//! Configuration types for service discovery

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the discovery coordinator and its backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Discovery domain appended to unqualified service types
    #[serde(default = "default_domain")]
    pub domain: String,

    /// How long the backend may spend resolving a single service (seconds)
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            resolve_timeout_secs: default_resolve_timeout(),
        }
    }
}

impl DiscoveryConfig {
    /// Returns the resolve timeout as a Duration
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.domain.is_empty() {
            return Err("domain cannot be empty".to_string());
        }

        if self.resolve_timeout_secs == 0 {
            return Err("resolve_timeout_secs cannot be 0".to_string());
        }

        Ok(())
    }
}

// Default configuration values
fn default_domain() -> String {
    "local.".to_string()
}

fn default_resolve_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.domain, "local.");
        assert_eq!(config.resolve_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = DiscoveryConfig {
            resolve_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_domain_rejected() {
        let config = DiscoveryConfig {
            domain: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
