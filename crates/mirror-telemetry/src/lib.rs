//! # Mirror Telemetry
//!
//! Observability for the mirror runtime: structured logs through `tracing`
//! and Prometheus metrics behind a fire-and-forget [`MetricsSink`] port.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mirror_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("telemetry init failed");
//!
//!     // Pipeline runs here; logs and metrics are live.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MIRROR_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `MIRROR_JSON_LOGS` | auto | JSON log lines (on inside containers) |
//! | `MIRROR_CONSOLE_OUTPUT` | `true` | Emit logs to the console |
//! | `MIRROR_METRICS_PORT` | `9100` | Prometheus scrape port |
//! | `MIRROR_NETWORK` | `testnet` | Network label on logs |

mod config;
mod metrics;
mod sink;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{encode_metrics, register_metrics, MetricsHandle, REGISTRY};
pub use sink::{MetricsSink, NoopSink, PrometheusSink};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("failed to initialize log subscriber: {0}")]
    SubscriberInit(String),

    /// A metric could not be registered.
    #[error("failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    tracing_setup::init_tracing(config)?;

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active for the process lifetime.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("shutting down telemetry");
    }
}
