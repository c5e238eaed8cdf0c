//! LanScout - local network service discovery daemon
//!
//! Browses for a DNS-SD service type, resolves each discovered instance
//! one at a time, and logs every notification stream until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use lanscout_core::DiscoveryConfig;
use lanscout_discovery::{DiscoveryController, MdnsBackend};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// LanScout - serialized mDNS discovery and resolution
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Service type to browse for (e.g. "_http._tcp")
    #[arg(short, long, default_value = "_http._tcp")]
    service_type: String,

    /// Discovery domain
    #[arg(long, default_value = "local.")]
    domain: String,

    /// Per-service resolve timeout in seconds
    #[arg(long, default_value_t = 10)]
    resolve_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = DiscoveryConfig {
        domain: args.domain,
        resolve_timeout_secs: args.resolve_timeout,
    };

    let backend =
        Arc::new(MdnsBackend::new(config).context("failed to initialize mDNS backend")?);
    let controller = DiscoveryController::new(backend);

    let running = controller.events().running.subscribe();
    let discovered = controller.events().discovered.subscribe();
    let resolved = controller.events().resolved.subscribe();
    let lost = controller.events().lost.subscribe();

    tokio::spawn(async move {
        while let Some(state) = running.recv().await {
            info!(running = state, "discovery state changed");
        }
    });
    tokio::spawn(async move {
        while let Some(record) = discovered.recv().await {
            info!(service = %record.key(), "discovered");
        }
    });
    tokio::spawn(async move {
        while let Some(record) = resolved.recv().await {
            info!(
                service = %record.key(),
                endpoint = %record.endpoint().unwrap_or_default(),
                attributes = record.attributes.len(),
                "resolved"
            );
        }
    });
    tokio::spawn(async move {
        while let Some(record) = lost.recv().await {
            info!(service = %record.key(), "lost");
        }
    });

    controller
        .start_discovery(&args.service_type)
        .context("failed to start discovery")?;
    info!(service_type = %args.service_type, "browsing; press Ctrl-C to stop");

    signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    controller.stop_discovery()?;
    info!("shutting down");
    Ok(())
}
