//! # Acceptance Pipeline
//!
//! One generic pipeline drives every stream kind; the `StreamProfile`
//! carries the per-kind differences (suffix, chain linkage, bypass
//! boundary). A polling cycle takes a fresh registry snapshot, lists
//! candidates past the cursor, and processes them in ascending filename
//! order so chained streams accept strictly in sequence.
//!
//! ## Failure policy
//!
//! Per-file failures are `FileOutcome` values, not errors. `NoQuorum` and
//! `Unverifiable` move on to the next filename and retry next cycle;
//! `ChainBroken` and `StoreFailure` halt the stream's cycle on the spot.
//! Only run-level failures (registry unreachable, cursor unreadable)
//! surface as `Err`, aborting the cycle before any file is touched.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mirror_telemetry::MetricsSink;
use qm_01_attestation::{AttestationApi, QuorumDecision};
use qm_02_stream_fetch::FetchApi;
use qm_03_stream_state::{validate_chain, CursorStore};
use shared_types::{
    AcceptedFile, FileOutcome, RegistrySnapshot, StreamCursor, StreamFileName, StreamKind,
    StreamProfile,
};

use crate::errors::PipelineError;
use crate::ports::outbound::{AcceptedSink, NodeRegistry};

/// How a polling cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The listing was exhausted (possibly zero candidates).
    Completed,
    /// A chain break or store failure stopped the stream mid-listing.
    Halted,
    /// Shutdown was requested between files.
    Interrupted,
    /// A previous run for the same stream kind was still in flight.
    Skipped,
}

/// Summary of one polling cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Correlation id shared by every log line of the cycle.
    pub cycle_id: Uuid,
    /// The stream the cycle polled.
    pub stream: StreamKind,
    /// How the cycle ended.
    pub outcome: CycleOutcome,
    /// Every processed filename with its terminal outcome, in order.
    pub processed: Vec<(StreamFileName, FileOutcome)>,
}

impl CycleReport {
    fn skipped(stream: StreamKind) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            stream,
            outcome: CycleOutcome::Skipped,
            processed: Vec::new(),
        }
    }

    /// Number of files accepted this cycle.
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.processed
            .iter()
            .filter(|(_, outcome)| *outcome == FileOutcome::Accepted)
            .count()
    }
}

/// The acceptance pipeline, shared by all stream schedulers.
///
/// All dependencies arrive as injected ports; the pipeline itself holds no
/// mutable state beyond the per-stream overlap guards.
pub struct Pipeline {
    attestation: Arc<dyn AttestationApi>,
    fetcher: Arc<dyn FetchApi>,
    cursor_store: Arc<dyn CursorStore>,
    registry: Arc<dyn NodeRegistry>,
    sink: Arc<dyn AcceptedSink>,
    metrics: Arc<dyn MetricsSink>,
    shutdown: watch::Receiver<bool>,
    balance_guard: Mutex<()>,
    record_guard: Mutex<()>,
}

impl Pipeline {
    /// Wire a pipeline from its ports.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        attestation: Arc<dyn AttestationApi>,
        fetcher: Arc<dyn FetchApi>,
        cursor_store: Arc<dyn CursorStore>,
        registry: Arc<dyn NodeRegistry>,
        sink: Arc<dyn AcceptedSink>,
        metrics: Arc<dyn MetricsSink>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            attestation,
            fetcher,
            cursor_store,
            registry,
            sink,
            metrics,
            shutdown,
            balance_guard: Mutex::new(()),
            record_guard: Mutex::new(()),
        }
    }

    fn guard(&self, kind: StreamKind) -> &Mutex<()> {
        match kind {
            StreamKind::Balance => &self.balance_guard,
            StreamKind::Record => &self.record_guard,
        }
    }

    /// The current durable position of one stream.
    pub async fn status(&self, kind: StreamKind) -> Result<StreamCursor, PipelineError> {
        Ok(self.cursor_store.get(kind).await?)
    }

    /// Run one polling cycle for `profile`'s stream.
    ///
    /// Safe to call from a timer without overlap protection: if the
    /// previous run for the same stream kind is still in flight, the call
    /// is a recorded no-op.
    pub async fn run_once(&self, profile: &StreamProfile) -> Result<CycleReport, PipelineError> {
        let Ok(_running) = self.guard(profile.kind).try_lock() else {
            self.metrics.record_skipped_tick(profile.kind);
            info!(
                stream = profile.kind.as_str(),
                "previous run still in flight, skipping tick"
            );
            return Ok(CycleReport::skipped(profile.kind));
        };

        let cycle_id = Uuid::new_v4();
        let cycle_started = Instant::now();

        let identities = self.registry.current_nodes().await?;
        let snapshot = RegistrySnapshot::from_identities(identities);
        let mut cursor = self.cursor_store.get(profile.kind).await?;

        info!(
            stream = profile.kind.as_str(),
            cycle = %cycle_id,
            nodes = snapshot.total_nodes(),
            position = cursor
                .last_accepted_file_name
                .as_ref()
                .map_or("genesis", StreamFileName::as_str),
            "starting poll cycle"
        );

        let names = self
            .fetcher
            .list_candidates(profile, cursor.last_accepted_file_name.as_ref())
            .await;
        debug!(
            stream = profile.kind.as_str(),
            cycle = %cycle_id,
            candidates = names.len(),
            "listing merged"
        );

        let mut processed = Vec::new();
        let mut outcome = CycleOutcome::Completed;

        for name in names {
            if *self.shutdown.borrow() {
                info!(
                    stream = profile.kind.as_str(),
                    cycle = %cycle_id,
                    "shutdown requested, stopping between files"
                );
                outcome = CycleOutcome::Interrupted;
                break;
            }

            let file_started = Instant::now();
            let file_outcome = self
                .process_file(profile, &snapshot, &mut cursor, &name, cycle_id)
                .await;
            self.metrics
                .record_outcome(profile.kind, file_outcome, file_started.elapsed());
            processed.push((name, file_outcome));

            if file_outcome.halts_cycle() {
                outcome = CycleOutcome::Halted;
                break;
            }
        }

        self.metrics
            .record_cycle(profile.kind, cycle_started.elapsed());
        let report = CycleReport {
            cycle_id,
            stream: profile.kind,
            outcome,
            processed,
        };
        info!(
            stream = profile.kind.as_str(),
            cycle = %cycle_id,
            processed = report.processed.len(),
            accepted = report.accepted_count(),
            outcome = ?report.outcome,
            "poll cycle finished"
        );
        Ok(report)
    }

    /// Process one candidate filename to its terminal outcome.
    ///
    /// On acceptance the durable cursor is advanced first, then `cursor`
    /// is updated in place so the next file in this cycle chains off the
    /// new position.
    async fn process_file(
        &self,
        profile: &StreamProfile,
        snapshot: &RegistrySnapshot,
        cursor: &mut StreamCursor,
        name: &StreamFileName,
        cycle_id: Uuid,
    ) -> FileOutcome {
        let claims = self.fetcher.fetch_signature_claims(profile, name).await;
        self.metrics.record_claims(profile.kind, claims.len());

        let result = self.attestation.evaluate(name.clone(), &claims, snapshot);
        let (accepted_hash, agreeing) = match result.decision {
            QuorumDecision::NoQuorum {
                distinct_claimants,
                required,
            } => {
                warn!(
                    stream = profile.kind.as_str(),
                    cycle = %cycle_id,
                    file = %name,
                    claimants = distinct_claimants,
                    required,
                    "no quorum yet, will retry next cycle"
                );
                return FileOutcome::NoQuorum;
            }
            QuorumDecision::Accepted {
                accepted_hash,
                agreeing_node_ids,
            } => (accepted_hash, agreeing_node_ids),
        };

        let Some(candidate) = self
            .fetcher
            .fetch_matching_candidate(profile, name, accepted_hash, &agreeing)
            .await
        else {
            warn!(
                stream = profile.kind.as_str(),
                cycle = %cycle_id,
                file = %name,
                hash = %accepted_hash,
                "quorum named a hash but no agreeing node served matching bytes"
            );
            return FileOutcome::Unverifiable;
        };

        let declared_previous_hash = if profile.chain_linked {
            match validate_chain(&candidate, cursor, profile.bypass_boundary.as_ref()) {
                Ok(declared) => Some(declared),
                Err(err) => {
                    error!(
                        stream = profile.kind.as_str(),
                        cycle = %cycle_id,
                        file = %name,
                        error = %err,
                        "chain continuity broken, halting stream until investigated"
                    );
                    return FileOutcome::ChainBroken;
                }
            }
        } else {
            None
        };

        if let Err(err) = self
            .cursor_store
            .advance(profile.kind, name.clone(), accepted_hash)
            .await
        {
            error!(
                stream = profile.kind.as_str(),
                cycle = %cycle_id,
                file = %name,
                error = %err,
                "cursor store refused the advance, aborting cycle"
            );
            return FileOutcome::StoreFailure;
        }
        *cursor = StreamCursor {
            stream_kind: profile.kind,
            last_accepted_file_name: Some(name.clone()),
            last_accepted_hash: accepted_hash,
        };

        let accepted = AcceptedFile {
            file_name: name.clone(),
            hash: accepted_hash,
            declared_previous_hash,
            bytes: candidate.bytes,
        };
        // The file is accepted either way; a failed handoff is an operator
        // problem, not grounds to roll the cursor back.
        if let Err(err) = self.sink.deliver(profile.kind, &accepted).await {
            error!(
                stream = profile.kind.as_str(),
                cycle = %cycle_id,
                file = %name,
                error = %err,
                "accepted file could not be handed downstream"
            );
        }

        info!(
            stream = profile.kind.as_str(),
            cycle = %cycle_id,
            file = %name,
            hash = %accepted_hash,
            attesters = agreeing.len(),
            "file accepted"
        );
        FileOutcome::Accepted
    }
}
