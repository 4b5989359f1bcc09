//! Fire-and-forget metrics port.
//!
//! The pipeline records observations through this trait so its code never
//! touches the Prometheus registry directly, and tests can run with the
//! no-op sink instead of global metric state.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use shared_types::{FileOutcome, StreamKind};

use crate::metrics::{
    CLAIMS_COLLECTED, CYCLE_DURATION, FILE_DURATION, FILE_OUTCOMES, LAST_ACCEPTED_TIMESTAMP,
    TICKS_SKIPPED,
};

/// Observability hook for the pipeline. Implementations must never fail or
/// block; a metrics problem is not a mirroring problem.
pub trait MetricsSink: Send + Sync {
    /// One file reached a terminal outcome.
    fn record_outcome(&self, stream: StreamKind, outcome: FileOutcome, duration: Duration);

    /// One polling cycle finished.
    fn record_cycle(&self, stream: StreamKind, duration: Duration);

    /// Signature claims were collected for one candidate file.
    fn record_claims(&self, stream: StreamKind, count: usize);

    /// A scheduler tick found the previous run still active.
    fn record_skipped_tick(&self, stream: StreamKind);
}

/// Prometheus-backed sink writing to the global registry.
#[derive(Debug, Default, Clone)]
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn record_outcome(&self, stream: StreamKind, outcome: FileOutcome, duration: Duration) {
        FILE_OUTCOMES
            .with_label_values(&[stream.as_str(), outcome.as_str()])
            .inc();
        FILE_DURATION
            .with_label_values(&[stream.as_str()])
            .observe(duration.as_secs_f64());
        if outcome == FileOutcome::Accepted {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or_default();
            LAST_ACCEPTED_TIMESTAMP
                .with_label_values(&[stream.as_str()])
                .set(now);
        }
    }

    fn record_cycle(&self, stream: StreamKind, duration: Duration) {
        CYCLE_DURATION
            .with_label_values(&[stream.as_str()])
            .observe(duration.as_secs_f64());
    }

    fn record_claims(&self, stream: StreamKind, count: usize) {
        CLAIMS_COLLECTED
            .with_label_values(&[stream.as_str()])
            .inc_by(count as f64);
    }

    fn record_skipped_tick(&self, stream: StreamKind) {
        TICKS_SKIPPED.with_label_values(&[stream.as_str()]).inc();
    }
}

/// Sink that records nothing. Used by tests and ad-hoc tooling.
#[derive(Debug, Default, Clone)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record_outcome(&self, _stream: StreamKind, _outcome: FileOutcome, _duration: Duration) {}

    fn record_cycle(&self, _stream: StreamKind, _duration: Duration) {}

    fn record_claims(&self, _stream: StreamKind, _count: usize) {}

    fn record_skipped_tick(&self, _stream: StreamKind) {}
}
