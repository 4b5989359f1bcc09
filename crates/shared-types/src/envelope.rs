//! # Detached Signature Envelope
//!
//! The byte format of the per-node signature objects the mirror fetches
//! alongside every data object.
//!
//! ## Layout (version 1)
//!
//! ```text
//! offset 0      version            (1 byte, = 0x01)
//! offset 1      digest marker      (1 byte, = 0x04)
//! offset 2      content digest     (48 bytes, SHA-384)
//! offset 50     signature marker   (1 byte, = 0x03)
//! offset 51     signature length   (2 bytes, big endian)
//! offset 53     signature          (length bytes, Ed25519 = 64)
//! ```
//!
//! Structural deviations (bad markers, truncation, oversized length) are
//! parse errors. A *well-formed* envelope whose signature length is wrong
//! for Ed25519 (including zero) still parses; classifying that as a
//! malformed signature is the verifier's job, so an empty signature is never
//! mistaken for evidence of tampering.

use crate::entities::FileHash;
use crate::errors::EnvelopeError;

/// Envelope format version this build reads and writes.
pub const ENVELOPE_VERSION: u8 = 1;

/// Marker byte preceding the 48-byte content digest.
pub const MARKER_CONTENT_DIGEST: u8 = 0x04;

/// Marker byte preceding the length-prefixed signature.
pub const MARKER_SIGNATURE: u8 = 0x03;

/// Byte length of an Ed25519 signature.
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// Upper bound on the declared signature length; anything larger is a
/// structural error, keeping hostile inputs bounded.
pub const MAX_SIGNATURE_LEN: usize = 512;

const DIGEST_LEN: usize = 48;
const HEADER_LEN: usize = 1 + 1 + DIGEST_LEN + 1 + 2;

/// A parsed signature object: the digest a node attests to plus its raw
/// signature bytes over that digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEnvelope {
    /// The content digest the signing node claims for the data object.
    pub claimed_hash: FileHash,
    /// The signature bytes as extracted; length is not validated here.
    pub signature: Vec<u8>,
}

impl SignatureEnvelope {
    /// Parses a raw signature object.
    pub fn parse(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < HEADER_LEN {
            return Err(EnvelopeError::Truncated {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedVersion { received: bytes[0] });
        }
        if bytes[1] != MARKER_CONTENT_DIGEST {
            return Err(EnvelopeError::UnexpectedMarker {
                offset: 1,
                found: bytes[1],
            });
        }
        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&bytes[2..2 + DIGEST_LEN]);

        let marker_offset = 2 + DIGEST_LEN;
        if bytes[marker_offset] != MARKER_SIGNATURE {
            return Err(EnvelopeError::UnexpectedMarker {
                offset: marker_offset,
                found: bytes[marker_offset],
            });
        }
        let len_offset = marker_offset + 1;
        let declared = u16::from_be_bytes([bytes[len_offset], bytes[len_offset + 1]]) as usize;
        if declared > MAX_SIGNATURE_LEN {
            return Err(EnvelopeError::SignatureLength { length: declared });
        }
        let sig_offset = len_offset + 2;
        let remaining = bytes.len() - sig_offset;
        if remaining < declared {
            return Err(EnvelopeError::Truncated {
                expected: sig_offset + declared,
                actual: bytes.len(),
            });
        }
        if remaining > declared {
            return Err(EnvelopeError::TrailingBytes {
                count: remaining - declared,
            });
        }

        Ok(Self {
            claimed_hash: FileHash(digest),
            signature: bytes[sig_offset..sig_offset + declared].to_vec(),
        })
    }

    /// Encodes this envelope into the version-1 wire layout.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.signature.len() <= MAX_SIGNATURE_LEN);
        let mut out = Vec::with_capacity(HEADER_LEN + self.signature.len());
        out.push(ENVELOPE_VERSION);
        out.push(MARKER_CONTENT_DIGEST);
        out.extend_from_slice(&self.claimed_hash.0);
        out.push(MARKER_SIGNATURE);
        out.extend_from_slice(&(self.signature.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.signature);
        out
    }
}
