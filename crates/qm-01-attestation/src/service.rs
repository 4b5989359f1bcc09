//! # Attestation Service
//!
//! Application service layer that implements the `AttestationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`AttestationApi`)
//! - Delegates verification and quorum math to the domain layer
//! - Owns the per-claim logging policy: a failed verification is evidence
//!   of corruption or a false attestation and logs at error level, while an
//!   unknown node is an abstention and logs at debug level only

use tracing::{debug, error, warn};

use shared_types::{RegistrySnapshot, SignatureClaim, StreamFileName};

use crate::domain::errors::{SignatureError, SignatureResult};
use crate::domain::quorum::{self, QuorumResult};
use crate::domain::verification;
use crate::ports::inbound::AttestationApi;

/// Attestation service.
///
/// Stateless: all inputs, including the key material, arrive per call via
/// the registry snapshot, so key rotation lands between polling cycles
/// without any shared mutable state here.
#[derive(Debug, Default, Clone)]
pub struct AttestationService;

impl AttestationService {
    /// Create a new attestation service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AttestationApi for AttestationService {
    fn verify_claim(
        &self,
        claim: &SignatureClaim,
        snapshot: &RegistrySnapshot,
    ) -> SignatureResult<()> {
        let key = snapshot
            .key_of(claim.node_id)
            .ok_or(SignatureError::UnknownNode {
                node_id: claim.node_id,
            })?;
        verification::verify_claim(claim, key)
    }

    fn resolve_quorum(
        &self,
        file_name: StreamFileName,
        eligible: &[SignatureClaim],
        total_nodes: usize,
    ) -> QuorumResult {
        quorum::resolve(file_name, eligible, total_nodes)
    }

    fn evaluate(
        &self,
        file_name: StreamFileName,
        claims: &[SignatureClaim],
        snapshot: &RegistrySnapshot,
    ) -> QuorumResult {
        let mut eligible = Vec::with_capacity(claims.len());
        for claim in claims {
            if claim.file_name != file_name {
                debug!(
                    node_id = %claim.node_id,
                    expected = %file_name,
                    got = %claim.file_name,
                    "dropping claim for a different filename"
                );
                continue;
            }
            match self.verify_claim(claim, snapshot) {
                Ok(()) => eligible.push(claim.clone()),
                Err(SignatureError::UnknownNode { node_id }) => {
                    debug!(%node_id, file = %file_name, "claim from unknown node excluded");
                }
                Err(SignatureError::MalformedSignature { node_id, ref reason }) => {
                    warn!(%node_id, file = %file_name, reason, "malformed signature excluded");
                }
                Err(SignatureError::VerificationFailed { node_id }) => {
                    error!(%node_id, file = %file_name, "signature failed verification");
                }
            }
        }
        self.resolve_quorum(file_name, &eligible, snapshot.total_nodes())
    }
}

// =============================================================================
// TESTS
// =============================================================================
