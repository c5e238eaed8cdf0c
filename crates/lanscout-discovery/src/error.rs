//! Error types for the discovery coordinator

use thiserror::Error;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors that can occur during service discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Caller supplied an empty or malformed service type
    #[error("invalid service type: {0:?}")]
    InvalidServiceType(String),

    /// Stop requested while no discovery session is active
    #[error("discovery is not running")]
    NotRunning,

    /// The discovery backend failed to initialize
    #[error("failed to initialize discovery backend: {0}")]
    BackendInit(String),

    /// Invalid discovery configuration
    #[error("invalid discovery configuration: {0}")]
    InvalidConfig(String),

    /// A single service's resolution failed; the candidate is dropped
    #[error("failed to resolve service '{service}': {reason}")]
    ResolveFailed { service: String, reason: String },
}

impl DiscoveryError {
    /// Creates a resolution failure for the given service key.
    pub fn resolve_failed(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResolveFailed {
            service: service.into(),
            reason: reason.into(),
        }
    }
}
