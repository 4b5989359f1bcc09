//! Hash-chain continuity rules for sequence-sensitive streams.
//!
//! Every chain-linked artifact opens with a preamble declaring the digest of
//! the file before it. Acceptance requires that declared anchor to match the
//! digest the cursor recorded for the last accepted file, with three
//! documented escapes: a cursor that has never accepted anything, the
//! 48-zero-byte sentinel some historical files declared instead of a real
//! anchor, and an operator-configured bypass boundary covering a known,
//! already-investigated gap.

use shared_types::{CandidateFile, ChainHeader, FileHash, StreamCursor, StreamFileName};
use tracing::debug;

use super::errors::ChainError;

/// Reads the declared previous-file digest out of a chain-linked artifact.
pub fn declared_anchor(candidate: &CandidateFile) -> Result<FileHash, ChainError> {
    let header = ChainHeader::parse(&candidate.bytes).map_err(|source| ChainError::Preamble {
        file_name: candidate.file_name.as_str().to_string(),
        source,
    })?;
    Ok(header.previous_hash)
}

/// Validates a quorum-accepted candidate against the stream's chain anchor.
///
/// Returns the declared previous hash on success so the caller can record it
/// alongside the accepted file. The pass rules, in order:
///
/// 1. declared anchor equals the cursor's last accepted hash
/// 2. the cursor has never accepted a file (nothing to anchor against)
/// 3. the declared anchor is the empty sentinel (historical placeholder)
/// 4. the filename falls at or before the configured bypass boundary
///
/// Anything else is a [`ChainError::HashMismatch`]: evidence that this
/// mirror and the network disagree about history, which must be investigated
/// rather than skipped.
pub fn validate_chain(
    candidate: &CandidateFile,
    cursor: &StreamCursor,
    bypass_boundary: Option<&StreamFileName>,
) -> Result<FileHash, ChainError> {
    let declared = declared_anchor(candidate)?;

    if declared == cursor.last_accepted_hash {
        return Ok(declared);
    }
    if cursor.is_genesis() {
        debug!(file = %candidate.file_name, "first acceptance for stream, anchor not checked");
        return Ok(declared);
    }
    if declared.is_empty_sentinel() {
        debug!(file = %candidate.file_name, "sentinel anchor accepted");
        return Ok(declared);
    }
    if let Some(boundary) = bypass_boundary {
        if candidate.file_name <= *boundary {
            debug!(
                file = %candidate.file_name,
                boundary = %boundary,
                "anchor mismatch inside bypass boundary"
            );
            return Ok(declared);
        }
    }

    Err(ChainError::HashMismatch {
        file_name: candidate.file_name.as_str().to_string(),
        declared,
        expected: cursor.last_accepted_hash,
    })
}
