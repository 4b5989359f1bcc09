//! # Mirror Container
//!
//! Wires the subsystem services to their filesystem adapters and hands
//! out the assembled pipeline. Construction order follows the data flow:
//! registry first (it defines the source set), then fetch, then durable
//! state, then the pipeline on top.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{watch, Semaphore};
use tracing::info;

use mirror_telemetry::PrometheusSink;
use qm_01_attestation::AttestationService;
use qm_02_stream_fetch::CandidateFetcher;
use qm_03_stream_state::FileCursorStore;

use crate::adapters::{AddressBookRegistry, ArchiveSink, FsObjectSource};
use crate::config::MirrorConfig;
use crate::pipeline::Pipeline;
use crate::ports::outbound::NodeRegistry;

/// The wired mirror: configuration plus the shared pipeline.
pub struct MirrorContainer {
    /// The configuration everything was wired from.
    pub config: MirrorConfig,
    /// The acceptance pipeline, shared by all stream schedulers.
    pub pipeline: Arc<Pipeline>,
}

impl MirrorContainer {
    /// Wire all adapters and services from `config`.
    ///
    /// The address book is read once here to enumerate the per-node
    /// source mounts. Quorum math keeps following the registry fresh
    /// every cycle; a node added to the book mid-run raises `N`
    /// immediately but contributes claims only after a restart picks up
    /// its source mount.
    pub async fn build(config: MirrorConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let registry = Arc::new(AddressBookRegistry::new(&config.registry.address_book_path));
        let identities = registry
            .current_nodes()
            .await
            .context("initial address book read")?;
        info!(
            nodes = identities.len(),
            book = %config.registry.address_book_path.display(),
            "address book loaded"
        );

        let sources: Vec<Arc<FsObjectSource>> = identities
            .iter()
            .map(|identity| Arc::new(FsObjectSource::new(identity.id, &config.sources.root_dir)))
            .collect();
        let worker_pool = Arc::new(Semaphore::new(config.sources.worker_pool_size));
        let fetcher = Arc::new(CandidateFetcher::new(
            sources,
            worker_pool,
            config.fetch_timeout(),
        ));
        info!(
            root = %config.sources.root_dir.display(),
            pool = config.sources.worker_pool_size,
            "candidate fetcher wired over node mounts"
        );

        let cursor_store = Arc::new(
            FileCursorStore::open(&config.storage.state_dir).context("opening cursor store")?,
        );
        info!(state_dir = %config.storage.state_dir.display(), "cursor store opened");

        let sink = Arc::new(ArchiveSink::new(&config.storage.data_dir));
        let pipeline = Arc::new(Pipeline::new(
            Arc::new(AttestationService::new()),
            fetcher,
            cursor_store,
            registry,
            sink,
            Arc::new(PrometheusSink),
            shutdown,
        ));

        Ok(Self { config, pipeline })
    }
}
