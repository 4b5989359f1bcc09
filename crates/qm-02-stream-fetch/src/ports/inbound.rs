//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use std::collections::BTreeSet;

use async_trait::async_trait;
use shared_types::{CandidateFile, FileHash, NodeId, SignatureClaim, StreamFileName, StreamProfile};

use crate::domain::errors::FetchResult;

/// Primary fetch API, one instance shared by all stream pipelines.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait FetchApi: Send + Sync {
    /// Enumerate candidate data objects newer than `after`, merged across
    /// every node source into one sorted, deduplicated set.
    ///
    /// Sources that fail contribute nothing; an empty result is a normal
    /// end of cycle, not an error.
    async fn list_candidates(
        &self,
        profile: &StreamProfile,
        after: Option<&StreamFileName>,
    ) -> Vec<StreamFileName>;

    /// Fetch and parse every node's signature object for `file_name`,
    /// concurrently and bounded by the worker pool.
    ///
    /// Returns one claim per source that produced a parseable envelope.
    /// The claims are unverified; attestation decides what they are worth.
    async fn fetch_signature_claims(
        &self,
        profile: &StreamProfile,
        file_name: &StreamFileName,
    ) -> Vec<SignatureClaim>;

    /// Fetch the data object for `file_name` from one specific node.
    async fn fetch_data(
        &self,
        profile: &StreamProfile,
        file_name: &StreamFileName,
        node_id: NodeId,
    ) -> FetchResult<CandidateFile>;

    /// Try agreeing nodes one at a time, in ascending id order, until a
    /// fetched candidate's recomputed hash equals `accepted_hash`.
    ///
    /// Lazy and short-circuiting: once a candidate matches, the remaining
    /// nodes are not contacted. `None` means no agreeing node served
    /// matching bytes this cycle (the file is unverifiable for now).
    async fn fetch_matching_candidate(
        &self,
        profile: &StreamProfile,
        file_name: &StreamFileName,
        accepted_hash: FileHash,
        agreeing: &BTreeSet<NodeId>,
    ) -> Option<CandidateFile>;
}
