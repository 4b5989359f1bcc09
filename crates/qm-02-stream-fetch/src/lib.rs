//! # Stream Fetch Subsystem (QM-02)
//!
//! Talks to the per-node storage locations. Each consensus node operates its
//! own object store; this subsystem fans out listings and signature fetches
//! across all of them, bounded by a shared worker pool, and fetches data
//! objects lazily one node at a time once quorum has named a hash to seek.
//!
//! ## Failure Model
//!
//! Any single source may be missing, stale, slow, or wrong. Every fetch
//! carries a timeout; a source that errors or times out simply contributes
//! nothing for this cycle. Partial results are used as-is, and nothing a
//! source does can abort the pipeline.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::errors::{FetchError, FetchResult, SourceError};
pub use ports::inbound::FetchApi;
pub use ports::outbound::{MockObjectSource, ObjectSource};
pub use service::CandidateFetcher;
