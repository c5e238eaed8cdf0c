//! # LanScout Core
//!
//! Shared data model and configuration for the LanScout service-discovery
//! coordinator.
//!
//! This crate provides the foundational building blocks for the system:
//!
//! - **Types**: [`ServiceRecord`], the canonical representation of a
//!   discovered or resolved network service.
//! - **Configuration**: [`DiscoveryConfig`] with serde defaults and
//!   validation.
//!
//! The coordinator itself (session lifecycle, resolution serialization,
//! event fan-out) lives in `lanscout-discovery`.

pub mod config;
pub mod types;

// Re-export commonly used types for convenience
pub use config::DiscoveryConfig;
pub use types::ServiceRecord;
