//! # Runtime Errors
//!
//! Failures of the runtime's own ports (registry, sink) and the run-level
//! pipeline error. Per-file failures are not errors at all; they are
//! `FileOutcome` values and the cycle loop branches on them.

use qm_03_stream_state::StoreError;
use thiserror::Error;

/// Errors from the node registry port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The address book could not be read at all.
    #[error("address book unavailable: {0}")]
    Unavailable(String),

    /// The address book was read but could not be understood.
    #[error("address book malformed: {0}")]
    Malformed(String),
}

/// Errors from the accepted-file sink port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The downstream write failed.
    #[error("delivery of '{file_name}' failed: {reason}")]
    Io {
        /// The accepted filename that could not be delivered.
        file_name: String,
        /// Description of the underlying failure.
        reason: String,
    },
}

/// Run-level pipeline failures.
///
/// These abort a cycle before any file is processed; nothing is advanced
/// and the next tick simply retries. Mid-cycle failures surface as
/// per-file outcomes instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The registry snapshot for the cycle could not be taken.
    #[error("node registry failed: {0}")]
    Registry(#[from] RegistryError),

    /// The cursor position for the cycle could not be loaded.
    #[error("cursor store failed: {0}")]
    Store(#[from] StoreError),
}
