//! # Quorum-Mirror Runtime
//!
//! Entry point of the mirror service. Wires the container from
//! environment configuration, spawns one polling scheduler per enabled
//! stream, and runs until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use mirror_runtime::{scheduler, MirrorConfig, MirrorContainer};
use mirror_telemetry::{init_telemetry, TelemetryConfig};

/// The running mirror: wired container plus one scheduler per stream.
struct MirrorRuntime {
    container: MirrorContainer,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl MirrorRuntime {
    /// Build the container and the shutdown channel.
    async fn new(config: MirrorConfig) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let container = MirrorContainer::build(config, shutdown_rx.clone()).await?;
        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            handles: Vec::new(),
        })
    }

    /// Spawn one polling scheduler per enabled stream.
    fn start(&mut self) {
        info!("===========================================");
        info!("  Quorum-Mirror Runtime v0.1.0");
        info!("  Network: {}", self.container.config.network);
        info!("===========================================");

        for profile in self.container.config.enabled_profiles() {
            let interval = self.container.config.poll_interval(profile.kind);
            info!(
                stream = profile.kind.as_str(),
                every_secs = interval.as_secs(),
                "starting stream scheduler"
            );
            self.handles.push(tokio::spawn(scheduler::run_stream_loop(
                Arc::clone(&self.container.pipeline),
                profile,
                interval,
                self.shutdown_rx.clone(),
            )));
        }

        info!("Source root: {:?}", self.container.config.sources.root_dir);
        info!("State dir:   {:?}", self.container.config.storage.state_dir);
        info!("Data dir:    {:?}", self.container.config.storage.data_dir);
    }

    /// Signal shutdown and wait for every scheduler to stop.
    async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Scheduler task failed to stop cleanly: {}", e);
            }
        }
        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(&TelemetryConfig::from_env()).context("initializing telemetry")?;

    let config = MirrorConfig::from_env();
    config.validate().context("validating configuration")?;

    let mut runtime = MirrorRuntime::new(config).await?;
    runtime.start();

    info!("Mirror is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
