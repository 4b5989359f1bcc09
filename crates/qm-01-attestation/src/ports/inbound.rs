//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use shared_types::{RegistrySnapshot, SignatureClaim, StreamFileName};

use crate::domain::errors::SignatureResult;
use crate::domain::quorum::QuorumResult;

/// Primary attestation API.
///
/// This is the entry point the pipeline uses per candidate filename.
/// Implementations must be thread-safe (`Send + Sync`).
pub trait AttestationApi: Send + Sync {
    /// Verify one claim against the registry snapshot.
    ///
    /// A node missing from the snapshot is `UnknownNode` (an abstention),
    /// not a verification failure.
    fn verify_claim(&self, claim: &SignatureClaim, snapshot: &RegistrySnapshot)
        -> SignatureResult<()>;

    /// Resolve quorum over claims that already passed verification.
    fn resolve_quorum(
        &self,
        file_name: StreamFileName,
        eligible: &[SignatureClaim],
        total_nodes: usize,
    ) -> QuorumResult;

    /// Full evaluation for one filename: verify every claim, keep the
    /// eligible ones, and resolve quorum against the snapshot's node count.
    fn evaluate(
        &self,
        file_name: StreamFileName,
        claims: &[SignatureClaim],
        snapshot: &RegistrySnapshot,
    ) -> QuorumResult;
}
