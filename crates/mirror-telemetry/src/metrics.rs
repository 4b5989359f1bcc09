//! Prometheus metrics for the mirror pipeline.
//!
//! All metrics follow the naming convention `mirror_<subsystem>_<name>_<unit>`.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry.
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PIPELINE METRICS
    // =========================================================================

    /// Terminal outcome of every processed file.
    pub static ref FILE_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new(
            "mirror_pipeline_file_outcomes_total",
            "Terminal outcomes per processed file"
        ),
        &["stream", "outcome"]
    ).expect("metric creation failed");

    /// Wall time from signature fetch to a file's terminal outcome.
    pub static ref FILE_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "mirror_pipeline_file_duration_seconds",
            "Time spent taking one file to a terminal outcome"
        ).buckets(exponential_buckets(0.01, 2.0, 12).expect("bucket layout")),
        &["stream"]
    ).expect("metric creation failed");

    /// Wall time of one full polling cycle.
    pub static ref CYCLE_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "mirror_pipeline_cycle_duration_seconds",
            "Time spent in one polling cycle"
        ).buckets(exponential_buckets(0.05, 2.0, 12).expect("bucket layout")),
        &["stream"]
    ).expect("metric creation failed");

    /// Unix time of the most recent acceptance per stream.
    pub static ref LAST_ACCEPTED_TIMESTAMP: GaugeVec = GaugeVec::new(
        Opts::new(
            "mirror_pipeline_last_accepted_timestamp_seconds",
            "Unix time of the most recent accepted file"
        ),
        &["stream"]
    ).expect("metric creation failed");

    // =========================================================================
    // ATTESTATION METRICS
    // =========================================================================

    /// Signature claims collected across sources, before verification.
    pub static ref CLAIMS_COLLECTED: CounterVec = CounterVec::new(
        Opts::new(
            "mirror_attestation_claims_total",
            "Signature claims collected from node sources"
        ),
        &["stream"]
    ).expect("metric creation failed");

    // =========================================================================
    // SCHEDULER METRICS
    // =========================================================================

    /// Timer ticks skipped because the previous run was still active.
    pub static ref TICKS_SKIPPED: CounterVec = CounterVec::new(
        Opts::new(
            "mirror_scheduler_ticks_skipped_total",
            "Timer ticks skipped while a run was in progress"
        ),
        &["stream"]
    ).expect("metric creation failed");
}

/// Handle pinning the registry for the process lifetime.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(FILE_OUTCOMES.clone()),
        Box::new(FILE_DURATION.clone()),
        Box::new(CYCLE_DURATION.clone()),
        Box::new(LAST_ACCEPTED_TIMESTAMP.clone()),
        Box::new(CLAIMS_COLLECTED.clone()),
        Box::new(TICKS_SKIPPED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
