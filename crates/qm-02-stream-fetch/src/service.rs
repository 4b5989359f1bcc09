//! # Candidate Fetcher Service
//!
//! Application service layer that implements the `FetchApi` trait.
//!
//! ## Concurrency
//!
//! Listing and signature fetches fan out across all sources at once, but
//! every outbound call first takes a permit from the injected worker pool,
//! so total in-flight fetches stay bounded however many stream pipelines
//! run in parallel. Data candidates are deliberately fetched one node at a
//! time: quorum already named the hash, so the first match ends the search.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use shared_types::{
    CandidateFile, FileHash, NodeId, SignatureClaim, SignatureEnvelope, StreamFileName,
    StreamProfile,
};

use crate::domain::errors::{FetchError, FetchResult, SourceError};
use crate::ports::inbound::FetchApi;
use crate::ports::outbound::ObjectSource;

/// Candidate fetcher over a set of per-node sources.
///
/// The worker pool is injected and shared: one semaphore bounds outbound
/// fetches across every stream kind's pipeline run.
pub struct CandidateFetcher<S: ObjectSource> {
    sources: Vec<Arc<S>>,
    worker_pool: Arc<Semaphore>,
    fetch_timeout: Duration,
}

impl<S: ObjectSource + 'static> CandidateFetcher<S> {
    /// Create a fetcher.
    pub fn new(sources: Vec<Arc<S>>, worker_pool: Arc<Semaphore>, fetch_timeout: Duration) -> Self {
        Self {
            sources,
            worker_pool,
            fetch_timeout,
        }
    }

    /// Number of registered sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn source_for(&self, node_id: NodeId) -> Option<&Arc<S>> {
        self.sources.iter().find(|s| s.node_id() == node_id)
    }

    /// One bounded, timed fetch. `None` folds every failure mode together:
    /// the source contributed nothing this cycle.
    async fn bounded_fetch(&self, source: Arc<S>, profile: &StreamProfile, object_name: String)
        -> Option<Vec<u8>> {
        let node_id = source.node_id();
        let permit = match Arc::clone(&self.worker_pool).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!(%node_id, "worker pool closed, skipping fetch");
                return None;
            }
        };
        let result = timeout(self.fetch_timeout, source.fetch(profile.kind, &object_name)).await;
        drop(permit);

        match result {
            Ok(Ok(bytes)) => Some(bytes),
            Ok(Err(SourceError::NotFound { object })) => {
                debug!(%node_id, object, "object not present at source");
                None
            }
            Ok(Err(error)) => {
                warn!(%node_id, object = object_name, %error, "source fetch failed");
                None
            }
            Err(_) => {
                warn!(%node_id, object = object_name, "source fetch timed out");
                None
            }
        }
    }
}

#[async_trait]
impl<S: ObjectSource + 'static> FetchApi for CandidateFetcher<S> {
    async fn list_candidates(
        &self,
        profile: &StreamProfile,
        after: Option<&StreamFileName>,
    ) -> Vec<StreamFileName> {
        let listings = join_all(self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let pool = Arc::clone(&self.worker_pool);
            let fetch_timeout = self.fetch_timeout;
            async move {
                let node_id = source.node_id();
                let _permit = match pool.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Vec::new(),
                };
                match timeout(fetch_timeout, source.list(profile.kind, after)).await {
                    Ok(Ok(names)) => names,
                    Ok(Err(error)) => {
                        warn!(%node_id, %error, "source listing failed");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(%node_id, "source listing timed out");
                        Vec::new()
                    }
                }
            }
        }))
        .await;

        let mut merged: BTreeSet<StreamFileName> = BTreeSet::new();
        for names in listings {
            for name in names {
                if !name.as_str().ends_with(&profile.data_suffix) {
                    continue;
                }
                if after.map_or(false, |a| &name <= a) {
                    continue;
                }
                merged.insert(name);
            }
        }
        merged.into_iter().collect()
    }

    async fn fetch_signature_claims(
        &self,
        profile: &StreamProfile,
        file_name: &StreamFileName,
    ) -> Vec<SignatureClaim> {
        let sig_object = file_name.signature_object();
        let fetched = join_all(self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let sig_object = sig_object.clone();
            async move {
                let node_id = source.node_id();
                let bytes = self.bounded_fetch(source, profile, sig_object).await?;
                Some((node_id, bytes))
            }
        }))
        .await;

        let mut claims = Vec::new();
        for (node_id, bytes) in fetched.into_iter().flatten() {
            match SignatureEnvelope::parse(&bytes) {
                Ok(envelope) => claims.push(SignatureClaim {
                    node_id,
                    file_name: file_name.clone(),
                    claimed_hash: envelope.claimed_hash,
                    raw_signature: envelope.signature,
                }),
                Err(error) => {
                    warn!(%node_id, file = %file_name, %error, "unparseable signature object");
                }
            }
        }
        claims
    }

    async fn fetch_data(
        &self,
        profile: &StreamProfile,
        file_name: &StreamFileName,
        node_id: NodeId,
    ) -> FetchResult<CandidateFile> {
        let source = self
            .source_for(node_id)
            .ok_or(FetchError::UnknownSource { node_id })?;

        let permit = Arc::clone(&self.worker_pool)
            .acquire_owned()
            .await
            .map_err(|_| FetchError::UnknownSource { node_id })?;
        let result = timeout(
            self.fetch_timeout,
            source.fetch(profile.kind, file_name.as_str()),
        )
        .await;
        drop(permit);

        match result {
            Ok(Ok(bytes)) => Ok(CandidateFile::from_bytes(file_name.clone(), node_id, bytes)),
            Ok(Err(source)) => Err(FetchError::Source { node_id, source }),
            Err(_) => Err(FetchError::Timeout { node_id }),
        }
    }

    async fn fetch_matching_candidate(
        &self,
        profile: &StreamProfile,
        file_name: &StreamFileName,
        accepted_hash: FileHash,
        agreeing: &BTreeSet<NodeId>,
    ) -> Option<CandidateFile> {
        for node_id in agreeing {
            match self.fetch_data(profile, file_name, *node_id).await {
                Ok(candidate) if candidate.computed_hash == accepted_hash => {
                    debug!(
                        node_id = %node_id,
                        file = %file_name,
                        hash = %accepted_hash,
                        "candidate matched accepted hash"
                    );
                    return Some(candidate);
                }
                Ok(candidate) => {
                    // Corrupt transfer or a false attestation; the next
                    // agreeing node may still serve good bytes.
                    warn!(
                        node_id = %node_id,
                        file = %file_name,
                        expected = %accepted_hash,
                        got = %candidate.computed_hash,
                        "candidate bytes do not match accepted hash"
                    );
                }
                Err(error) => {
                    warn!(node_id = %node_id, file = %file_name, %error, "candidate fetch failed");
                }
            }
        }
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================
