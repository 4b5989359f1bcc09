//! Error types for chain validation and cursor storage.

use shared_types::{FileHash, PreambleError, StreamKind};
use thiserror::Error;

/// Why a quorum-accepted candidate failed chain validation.
///
/// Any of these halts the stream kind for the rest of the cycle. The broken
/// anchor makes every later file unverifiable, so continuing would only bury
/// the discontinuity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// The artifact's preamble could not be read, so its declared anchor is
    /// unknown.
    #[error("unreadable chain preamble in '{file_name}': {source}")]
    Preamble {
        file_name: String,
        #[source]
        source: PreambleError,
    },

    /// The declared previous hash does not match the last accepted file.
    #[error("chain break at '{file_name}': declared anchor {declared} but cursor holds {expected}")]
    HashMismatch {
        file_name: String,
        declared: FileHash,
        expected: FileHash,
    },
}

/// Failures of the durable cursor store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("cursor store I/O failure: {0}")]
    Io(String),

    /// The on-disk record failed its checksum or could not be decoded.
    #[error("cursor store corrupt: {reason}")]
    Corrupt { reason: String },

    /// Another process holds the store's advisory lock.
    #[error("cursor store already locked at {path}")]
    Locked { path: String },

    /// An advance would move the cursor backwards or sideways.
    #[error("cursor regression on {stream}: '{attempted}' does not advance past '{current}'")]
    Regression {
        stream: StreamKind,
        current: String,
        attempted: String,
    },
}

/// Convenience alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
