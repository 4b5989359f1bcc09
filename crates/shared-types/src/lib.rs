//! # Shared Types Crate
//!
//! This crate contains the domain vocabulary shared by every Quorum-Mirror
//! subsystem: node identities, stream kinds, filenames, content hashes, and
//! the two wire formats the mirror commits to: the detached signature
//! envelope and the chained-artifact preamble.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Fixed Scheme**: Content hashes are SHA-384 (48 bytes) and signatures
//!   are Ed25519 (64 bytes). Both are encoded with explicit versioned
//!   formats so a malformed object is rejected at parse time, not deep in
//!   the pipeline.
//! - **Ephemeral Claims**: `SignatureClaim` and `CandidateFile` live for one
//!   polling cycle; only `StreamCursor` is ever persisted.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod preamble;

pub use entities::*;
pub use envelope::SignatureEnvelope;
pub use errors::*;
pub use preamble::ChainHeader;
