//! # Chained-Artifact Preamble
//!
//! Sequence-sensitive stream kinds embed the previous file's content digest
//! in a fixed preamble, forming a hash chain across consecutive files. The
//! chain validator reads this field; everything after the preamble is opaque
//! domain content left to downstream parsers.
//!
//! ## Layout (version 1)
//!
//! ```text
//! offset 0      format version     (2 bytes, big endian, = 1)
//! offset 2      digest algorithm   (1 byte, 0x01 = SHA-384)
//! offset 3      previous hash      (48 bytes)
//! offset 51     body               (opaque, not interpreted here)
//! ```

use crate::entities::FileHash;
use crate::errors::PreambleError;

/// Preamble format version this build reads and writes.
pub const PREAMBLE_VERSION: u16 = 1;

/// Algorithm id for SHA-384, the only digest this build accepts.
pub const ALGORITHM_SHA384: u8 = 0x01;

const DIGEST_LEN: usize = 48;

/// Byte length of the fixed preamble.
pub const PREAMBLE_LEN: usize = 2 + 1 + DIGEST_LEN;

/// The parsed preamble of a chain-linked artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainHeader {
    /// Format version of the artifact.
    pub version: u16,
    /// Digest of the previous file in the stream, or the empty sentinel.
    pub previous_hash: FileHash,
}

impl ChainHeader {
    /// Parses the preamble of a chain-linked artifact.
    pub fn parse(bytes: &[u8]) -> Result<Self, PreambleError> {
        if bytes.len() < PREAMBLE_LEN {
            return Err(PreambleError::Truncated {
                expected: PREAMBLE_LEN,
                actual: bytes.len(),
            });
        }
        let version = u16::from_be_bytes([bytes[0], bytes[1]]);
        if version != PREAMBLE_VERSION {
            return Err(PreambleError::UnsupportedVersion { received: version });
        }
        if bytes[2] != ALGORITHM_SHA384 {
            return Err(PreambleError::UnknownAlgorithm { id: bytes[2] });
        }
        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&bytes[3..3 + DIGEST_LEN]);
        Ok(Self {
            version,
            previous_hash: FileHash(digest),
        })
    }

    /// Encodes a version-1 preamble for `previous_hash`, returning the bytes
    /// a producer would prepend to the artifact body.
    #[must_use]
    pub fn encode(previous_hash: FileHash) -> Vec<u8> {
        let mut out = Vec::with_capacity(PREAMBLE_LEN);
        out.extend_from_slice(&PREAMBLE_VERSION.to_be_bytes());
        out.push(ALGORITHM_SHA384);
        out.extend_from_slice(&previous_hash.0);
        out
    }
}
