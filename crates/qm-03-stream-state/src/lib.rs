//! # Stream State Subsystem (QM-03)
//!
//! Owns the two pieces of state that make mirroring trustworthy across
//! restarts: the hash chain linking consecutive files of sequence-sensitive
//! streams, and the durable cursor recording the last accepted file per
//! stream kind.
//!
//! ## Chain Continuity
//!
//! Chain-linked artifacts embed the previous file's digest in a fixed
//! preamble. A candidate whose declared anchor does not match the cursor is
//! rejected; the stream halts until an operator investigates or configures a
//! bypass boundary for a known historical gap.
//!
//! ## Cursor Durability
//!
//! The cursor is advanced exactly once per accepted file, after quorum and
//! chain validation both pass, and is never rolled back. The file-backed
//! store writes through a checksummed temp file and holds an advisory lock
//! so two mirror processes cannot share one state directory.

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-export public API
pub use adapters::file::FileCursorStore;
pub use adapters::memory::MemoryCursorStore;
pub use domain::chain::{declared_anchor, validate_chain};
pub use domain::errors::{ChainError, StoreError, StoreResult};
pub use ports::outbound::{CursorStore, MockCursorStore};
