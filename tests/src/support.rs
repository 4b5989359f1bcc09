//! # Test Support
//!
//! Cluster fixtures shared by the integration and adversarial suites.
//! A `Cluster` owns the mock node set (keys, per-node object stores,
//! registry, sink, cursor store) and builds a fresh pipeline per cycle,
//! matching how the real runtime sees fresh state every poll.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ed25519_dalek::{Signer, SigningKey};
use tokio::sync::{watch, Semaphore};

use mirror_runtime::pipeline::{CycleReport, Pipeline};
use mirror_runtime::ports::outbound::{AcceptedSink, MockAcceptedSink, MockNodeRegistry, NodeRegistry};
use mirror_telemetry::NoopSink;
use qm_01_attestation::AttestationService;
use qm_02_stream_fetch::{CandidateFetcher, MockObjectSource};
use qm_03_stream_state::{CursorStore, MemoryCursorStore};
use shared_types::{
    ChainHeader, FileHash, NodeId, NodeIdentity, SignatureEnvelope, StreamCursor, StreamFileName,
    StreamKind, StreamProfile,
};

/// Deterministic signing key for a node id.
pub fn signing_key(id: u64) -> SigningKey {
    SigningKey::from_bytes(&[id as u8; 32])
}

/// The identity a cluster publishes for `id`.
pub fn identity(id: u64) -> NodeIdentity {
    NodeIdentity {
        id: NodeId(id),
        public_key: signing_key(id).verifying_key().to_bytes(),
    }
}

/// Encoded signature envelope: `signer`'s key over the digest of `content`.
pub fn envelope(content: &[u8], signer: &SigningKey) -> Vec<u8> {
    envelope_for_hash(FileHash::digest_of(content), signer)
}

/// Encoded signature envelope over an arbitrary hash.
pub fn envelope_for_hash(hash: FileHash, signer: &SigningKey) -> Vec<u8> {
    let signature = signer.sign(&hash.0);
    SignatureEnvelope {
        claimed_hash: hash,
        signature: signature.to_bytes().to_vec(),
    }
    .encode()
}

/// Record-stream bytes: chained preamble anchored at `previous`, then `body`.
pub fn chained(previous: FileHash, body: &[u8]) -> Vec<u8> {
    [ChainHeader::encode(previous), body.to_vec()].concat()
}

/// A mock consensus cluster behind the mirror.
///
/// Object stores are snapshotted into each pipeline the cluster builds,
/// so mutate the cluster first, then `run` a cycle. The cursor store,
/// registry, and sink are long-lived across cycles.
pub struct Cluster {
    keys: BTreeMap<u64, SigningKey>,
    sources: BTreeMap<u64, MockObjectSource>,
    /// Swappable membership; `set_membership` changes who counts.
    pub registry: Arc<MockNodeRegistry>,
    /// Durable cursor positions, shared across cycles.
    pub store: Arc<dyn CursorStore>,
    /// Records every delivered file.
    pub sink: Arc<MockAcceptedSink>,
}

impl Cluster {
    /// A cluster of `ids` over an in-memory cursor store.
    pub fn new(ids: &[u64]) -> Self {
        Self::with_store(ids, Arc::new(MemoryCursorStore::new()))
    }

    /// A cluster of `ids` over a caller-provided cursor store.
    pub fn with_store(ids: &[u64], store: Arc<dyn CursorStore>) -> Self {
        let keys = ids.iter().map(|id| (*id, signing_key(*id))).collect();
        let sources = ids
            .iter()
            .map(|id| (*id, MockObjectSource::new(NodeId(*id))))
            .collect();
        let registry = Arc::new(MockNodeRegistry::with_identities(
            ids.iter().map(|id| identity(*id)).collect(),
        ));
        Self {
            keys,
            sources,
            registry,
            store,
            sink: Arc::new(MockAcceptedSink::new()),
        }
    }

    /// Shrink or grow the advertised membership.
    ///
    /// Keys and object stores exist for every id the cluster was created
    /// with; the registry decides who counts toward quorum.
    pub fn set_membership(&self, ids: &[u64]) {
        self.registry
            .set_identities(ids.iter().map(|id| identity(*id)).collect());
    }

    /// Store `bytes` as `name` in `node`'s object store.
    pub fn publish(&mut self, node: u64, kind: StreamKind, name: &str, bytes: &[u8]) {
        self.source_mut(node).insert(kind, name, bytes.to_vec());
    }

    /// Publish `node`'s signature object for `name`, attesting to the
    /// digest of `content` with the node's own key.
    pub fn attest(&mut self, node: u64, kind: StreamKind, name: &str, content: &[u8]) {
        let env = envelope(content, &self.keys[&node]);
        self.insert_signature(node, kind, name, env);
    }

    /// Attest to an arbitrary hash, whatever bytes the node serves.
    pub fn attest_hash(&mut self, node: u64, kind: StreamKind, name: &str, hash: FileHash) {
        let env = envelope_for_hash(hash, &self.keys[&node]);
        self.insert_signature(node, kind, name, env);
    }

    /// Attest with a foreign key; the registry key will not match.
    pub fn attest_with_key(
        &mut self,
        node: u64,
        kind: StreamKind,
        name: &str,
        content: &[u8],
        signer: &SigningKey,
    ) {
        let env = envelope(content, signer);
        self.insert_signature(node, kind, name, env);
    }

    /// Publish and attest `content` on every node of the cluster.
    pub fn publish_everywhere(&mut self, kind: StreamKind, name: &str, content: &[u8]) {
        let ids: Vec<u64> = self.keys.keys().copied().collect();
        for id in ids {
            self.publish(id, kind, name, content);
            self.attest(id, kind, name, content);
        }
    }

    fn insert_signature(&mut self, node: u64, kind: StreamKind, name: &str, env: Vec<u8>) {
        let sig_name = StreamFileName::from(name).signature_object();
        self.source_mut(node).insert(kind, sig_name, env);
    }

    fn source_mut(&mut self, node: u64) -> &mut MockObjectSource {
        self.sources
            .get_mut(&node)
            .expect("unknown node id in fixture")
    }

    /// Build a fresh pipeline over the current cluster state, the way a
    /// new polling cycle sees it.
    pub fn pipeline(&self) -> (Pipeline, watch::Sender<bool>) {
        let fetcher = CandidateFetcher::new(
            self.sources.values().cloned().map(Arc::new).collect(),
            Arc::new(Semaphore::new(4)),
            Duration::from_secs(5),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let pipeline = Pipeline::new(
            Arc::new(AttestationService::new()),
            Arc::new(fetcher),
            Arc::clone(&self.store),
            Arc::clone(&self.registry) as Arc<dyn NodeRegistry>,
            Arc::clone(&self.sink) as Arc<dyn AcceptedSink>,
            Arc::new(NoopSink),
            shutdown_rx,
        );
        (pipeline, shutdown_tx)
    }

    /// Run one polling cycle for `profile`.
    pub async fn run(&self, profile: &StreamProfile) -> CycleReport {
        let (pipeline, _shutdown) = self.pipeline();
        pipeline
            .run_once(profile)
            .await
            .expect("run-level failure in fixture cluster")
    }

    /// Current durable cursor of `kind`.
    pub async fn cursor(&self, kind: StreamKind) -> StreamCursor {
        self.store
            .get(kind)
            .await
            .expect("cursor store failure in fixture")
    }

    /// Object names fetched from `node`'s store so far, in call order.
    pub fn fetched_from(&self, node: u64) -> Vec<String> {
        self.sources[&node].fetched()
    }
}

// =============================================================================
// Filesystem fixtures (for end-to-end runs over the real adapters)
// =============================================================================

/// Write an address book for `ids` under `path`.
pub fn write_address_book(path: &Path, ids: &[u64]) {
    let entries: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{ "id": {id}, "public_key": "{}" }}"#,
                hex::encode(signing_key(*id).verifying_key().to_bytes())
            )
        })
        .collect();
    std::fs::write(path, format!("[{}]", entries.join(","))).expect("writing address book");
}

/// Place one object in a node's filesystem mount.
pub fn fs_publish(root: &Path, node: u64, kind: StreamKind, name: &str, bytes: &[u8]) {
    let dir = root.join(node.to_string()).join(kind.as_str());
    std::fs::create_dir_all(&dir).expect("creating mount dir");
    std::fs::write(dir.join(name), bytes).expect("writing object");
}

/// Publish and attest `content` on every node's mount.
pub fn fs_publish_everywhere(
    root: &Path,
    ids: &[u64],
    kind: StreamKind,
    name: &str,
    content: &[u8],
) {
    for id in ids {
        fs_publish(root, *id, kind, name, content);
        let env = envelope(content, &signing_key(*id));
        fs_publish(
            root,
            *id,
            kind,
            &StreamFileName::from(name).signature_object(),
            &env,
        );
    }
}
