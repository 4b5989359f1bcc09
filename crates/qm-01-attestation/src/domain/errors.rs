//! # Attestation Errors
//!
//! Error types for claim verification.
//!
//! The three variants split along the line the pipeline cares about:
//! `UnknownNode` is an abstention (the claim cannot be evaluated and is
//! excluded without penalty), while `MalformedSignature` and
//! `VerificationFailed` are evaluable failures that exclude the claim and
//! get logged.

use shared_types::NodeId;
use thiserror::Error;

/// Errors that can occur while verifying a single signature claim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No usable key on file for the claiming node. Distinct from an invalid
    /// signature: the claim is excluded, not counted as tampering.
    #[error("no usable public key on file for node {node_id}")]
    UnknownNode { node_id: NodeId },

    /// The signature bytes are structurally unusable (zero length, wrong
    /// length for Ed25519).
    #[error("malformed signature from node {node_id}: {reason}")]
    MalformedSignature { node_id: NodeId, reason: String },

    /// The signature does not verify against the claimed digest and the
    /// node's key. Evidence of corruption or a false attestation.
    #[error("signature verification failed for node {node_id}")]
    VerificationFailed { node_id: NodeId },
}

/// Result alias for claim verification.
pub type SignatureResult<T> = Result<T, SignatureError>;
