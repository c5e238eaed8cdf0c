//! Service-Discovery Coordination for LanScout
//!
//! This crate turns the raw, bursty event stream of a platform
//! discovery/resolution primitive into an orderly sequence of
//! application-visible notifications:
//!
//! - Serializes expensive per-service resolution behind a single-flight
//!   FIFO queue, so at most one resolve request is ever outstanding
//! - Owns discovery session lifecycle with restart-on-start semantics and
//!   stale-session isolation
//! - Fans results out on four independent, ordered, single-subscriber
//!   event streams: running, discovered, resolved, lost
//!
//! # Architecture
//!
//! The platform primitive sits behind the [`DiscoveryBackend`] trait. The
//! bundled [`MdnsBackend`] implements it on top of the `mdns-sd` crate;
//! tests drive the coordinator with scripted in-memory backends.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lanscout_core::DiscoveryConfig;
//! use lanscout_discovery::{DiscoveryController, MdnsBackend, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let backend = Arc::new(MdnsBackend::new(DiscoveryConfig::default())?);
//!     let controller = DiscoveryController::new(backend);
//!
//!     let resolved = controller.events().resolved.subscribe();
//!     controller.start_discovery("_http._tcp")?;
//!
//!     while let Some(record) = resolved.recv().await {
//!         println!("{} at {}", record.name, record.endpoint().unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod controller;
pub mod error;
pub mod events;
pub mod mdns;
pub mod resolver;

pub use backend::{BackendEvent, DiscoveryBackend, SessionHandle};
pub use controller::DiscoveryController;
pub use error::{DiscoveryError, Result};
pub use events::{DiscoveryEvents, EventStream, Subscription};
pub use mdns::MdnsBackend;
pub use resolver::ResolutionCoordinator;
