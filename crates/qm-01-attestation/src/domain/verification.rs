//! # Claim Verification
//!
//! Verifies one detached signature claim against a node's public key.
//!
//! The fixed scheme is Ed25519 over the 48-byte SHA-384 content digest: the
//! digest itself is the signed message, matching the envelope format which
//! carries digest plus signature and never the file body.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use shared_types::{PublicKey, SignatureClaim};

use crate::domain::errors::{SignatureError, SignatureResult};

/// Byte length of an Ed25519 signature.
const SIGNATURE_LEN: usize = 64;

/// Verifies a claim's signature over its claimed digest.
///
/// Pure function over its inputs; no I/O, no clocks.
///
/// A key that fails Ed25519 point validation is reported as `UnknownNode`:
/// the registry has no *usable* key on file, so the claim cannot be
/// evaluated and must be excluded rather than penalized.
pub fn verify_claim(claim: &SignatureClaim, key: &PublicKey) -> SignatureResult<()> {
    if claim.raw_signature.is_empty() {
        return Err(SignatureError::MalformedSignature {
            node_id: claim.node_id,
            reason: "zero signature bytes".to_string(),
        });
    }
    if claim.raw_signature.len() != SIGNATURE_LEN {
        return Err(SignatureError::MalformedSignature {
            node_id: claim.node_id,
            reason: format!(
                "signature length {} is not an Ed25519 signature",
                claim.raw_signature.len()
            ),
        });
    }

    let verifying_key = VerifyingKey::from_bytes(key).map_err(|_| SignatureError::UnknownNode {
        node_id: claim.node_id,
    })?;

    let mut sig_bytes = [0u8; SIGNATURE_LEN];
    sig_bytes.copy_from_slice(&claim.raw_signature);
    let signature = Signature::from_bytes(&sig_bytes);

    verifying_key
        .verify(&claim.claimed_hash.0, &signature)
        .map_err(|_| SignatureError::VerificationFailed {
            node_id: claim.node_id,
        })
}
