//! # Error Types
//!
//! Codec errors shared across subsystems. Per-subsystem errors (signature
//! verification, fetch, chain, store) live in their own crates; only the two
//! wire formats defined here carry their errors here.

use thiserror::Error;

/// Errors from parsing a detached signature object.
///
/// All of these mean "malformed object", never "bad signature": a claim that
/// fails to parse is excluded from quorum as unevaluable, not counted as
/// evidence of tampering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The object is shorter than the fixed layout requires.
    #[error("signature object truncated: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The version byte is not one this build reads.
    #[error("unsupported signature object version: {received}")]
    UnsupportedVersion { received: u8 },

    /// A structural marker byte was wrong.
    #[error("unexpected marker {found:#04x} at offset {offset}")]
    UnexpectedMarker { offset: usize, found: u8 },

    /// The declared signature length exceeds the format's upper bound.
    #[error("declared signature length {length} exceeds the format maximum")]
    SignatureLength { length: usize },

    /// Bytes follow the signature.
    #[error("{count} trailing bytes after signature")]
    TrailingBytes { count: usize },
}

/// Errors from parsing a chained-artifact preamble.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreambleError {
    /// The artifact is shorter than the fixed preamble.
    #[error("artifact preamble truncated: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The format version is not one this build reads.
    #[error("unsupported artifact format version: {received}")]
    UnsupportedVersion { received: u16 },

    /// The digest algorithm id is not SHA-384.
    #[error("unknown digest algorithm id: {id:#04x}")]
    UnknownAlgorithm { id: u8 },
}
