//! # Core Domain Entities
//!
//! Defines the entities flowing through the download-verify-accept pipeline.
//!
//! ## Clusters
//!
//! - **Identity**: `NodeId`, `NodeIdentity`, `RegistrySnapshot`
//! - **Streams**: `StreamKind`, `StreamFileName`, `StreamProfile`
//! - **Acceptance**: `SignatureClaim`, `CandidateFile`, `AcceptedFile`,
//!   `FileOutcome`
//! - **State**: `StreamCursor`

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha384};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Unique identifier for a consensus node in the mirrored network.
///
/// Node ids are small operator-assigned integers. Their `Ord` is the
/// deterministic order used when trying data candidates one at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node's identity as published by the network's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// The node's id.
    pub id: NodeId,
    /// The node's current Ed25519 signing key.
    pub public_key: PublicKey,
}

/// An immutable snapshot of the node registry, taken once per polling cycle.
///
/// The snapshot is the sole source of `totalNodeCount` for quorum math and of
/// public keys for signature verification. Swapping in a fresh snapshot
/// between cycles is how key rotation and membership changes land.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    keys: BTreeMap<NodeId, PublicKey>,
}

impl RegistrySnapshot {
    /// Builds a snapshot from a list of identities.
    ///
    /// Duplicate ids keep the last entry, matching an address book where a
    /// re-listed node supersedes its earlier row.
    pub fn from_identities(identities: Vec<NodeIdentity>) -> Self {
        let keys = identities
            .into_iter()
            .map(|identity| (identity.id, identity.public_key))
            .collect();
        Self { keys }
    }

    /// Number of known nodes. This is the `N` of the supermajority rule.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.keys.len()
    }

    /// True when no nodes are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Looks up the signing key for a node, if the node is known.
    #[must_use]
    pub fn key_of(&self, id: NodeId) -> Option<&PublicKey> {
        self.keys.get(&id)
    }

    /// All known node ids in ascending order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.keys.keys().copied().collect()
    }

    /// Iterates the snapshot as identities, ascending by id.
    pub fn identities(&self) -> impl Iterator<Item = NodeIdentity> + '_ {
        self.keys.iter().map(|(id, key)| NodeIdentity {
            id: *id,
            public_key: *key,
        })
    }
}

// =============================================================================
// CLUSTER B: STREAMS
// =============================================================================

/// A category of periodically-produced artifact with its own cursor and
/// cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Whole-network balance snapshots.
    Balance,
    /// Sequential event/record stream, hash-chained file to file.
    Record,
}

impl StreamKind {
    /// Stable lowercase name, used for metric labels and storage keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Balance => "balance",
            StreamKind::Record => "record",
        }
    }

    /// All stream kinds, in a fixed order.
    #[must_use]
    pub fn all() -> &'static [StreamKind] {
        &[StreamKind::Balance, StreamKind::Record]
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balance" => Ok(StreamKind::Balance),
            "record" => Ok(StreamKind::Record),
            other => Err(format!("unknown stream kind: {other}")),
        }
    }
}

/// A logical artifact filename within one stream kind.
///
/// The naming convention guarantees lexical order equals chronological order,
/// so `Ord` on the inner string is the processing order of the pipeline.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct StreamFileName(String);

/// Suffix appended to a data object's name to form its signature object name.
pub const SIGNATURE_OBJECT_SUFFIX: &str = "_sig";

impl StreamFileName {
    /// Wraps a raw object name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the detached signature object for this data object.
    #[must_use]
    pub fn signature_object(&self) -> String {
        format!("{}{}", self.0, SIGNATURE_OBJECT_SUFFIX)
    }
}

impl fmt::Display for StreamFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamFileName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Per-stream capability profile, selected via configuration.
///
/// One generic pipeline consumes this instead of specializing per artifact
/// kind: the profile says whether files carry the chained-preamble, which
/// suffix data objects use, and where the operator-configured bypass boundary
/// sits (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamProfile {
    /// Which stream this profile describes.
    pub kind: StreamKind,
    /// Whether files embed a previous-hash preamble that must chain.
    pub chain_linked: bool,
    /// Required filename suffix for data objects (listing filter).
    pub data_suffix: String,
    /// Inclusive filename boundary at/below which chain mismatches are
    /// tolerated. `None` means no bypass window is configured.
    pub bypass_boundary: Option<StreamFileName>,
}

impl StreamProfile {
    /// Profile for the balance snapshot stream (no chain linkage).
    #[must_use]
    pub fn balance() -> Self {
        Self {
            kind: StreamKind::Balance,
            chain_linked: false,
            data_suffix: ".qbf".to_string(),
            bypass_boundary: None,
        }
    }

    /// Profile for the hash-chained record stream.
    #[must_use]
    pub fn record() -> Self {
        Self {
            kind: StreamKind::Record,
            chain_linked: true,
            data_suffix: ".qrs".to_string(),
            bypass_boundary: None,
        }
    }
}

// =============================================================================
// CLUSTER C: HASHING
// =============================================================================

/// A 48-byte SHA-384 content digest.
///
/// The all-zero value doubles as the documented "empty" sentinel: an unset
/// chain anchor, or the historical placeholder some early files declared as
/// their previous hash.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHash(#[serde_as(as = "Bytes")] pub [u8; 48]);

impl FileHash {
    /// The empty/genesis sentinel (48 zero bytes).
    pub const EMPTY: FileHash = FileHash([0u8; 48]);

    /// Computes the SHA-384 digest of `bytes`.
    #[must_use]
    pub fn digest_of(bytes: &[u8]) -> Self {
        let digest = Sha384::digest(bytes);
        let mut out = [0u8; 48];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// True for the empty/genesis sentinel.
    #[must_use]
    pub fn is_empty_sentinel(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Full lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 96-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let raw = hex::decode(s)?;
        let mut out = [0u8; 48];
        if raw.len() != out.len() {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        out.copy_from_slice(&raw);
        Ok(Self(out))
    }
}

impl Default for FileHash {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for FileHash {
    /// Abbreviated form for logs: first 8 hex chars.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..8])
    }
}

// =============================================================================
// CLUSTER D: ACCEPTANCE
// =============================================================================

/// One node's attestation for one filename, parsed from its signature object.
///
/// Ephemeral: created per fetch, discarded after quorum resolution. The
/// signature bytes are carried raw; the verifier classifies a wrong or zero
/// length as malformed rather than the parser dropping the claim, so an
/// empty signature is reported as `MalformedSignature` and never as
/// `VerificationFailed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureClaim {
    /// The node whose source produced the signature object.
    pub node_id: NodeId,
    /// The data object the claim is about.
    pub file_name: StreamFileName,
    /// The content digest the node attests to.
    pub claimed_hash: FileHash,
    /// The raw signature bytes extracted from the envelope (64 for Ed25519).
    pub raw_signature: Vec<u8>,
}

/// A fetched data object before it is accepted or rejected.
///
/// Ephemeral: discarded once promoted or rejected. `computed_hash` is always
/// recomputed locally from `bytes`, never trusted from the source.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// The object's filename.
    pub file_name: StreamFileName,
    /// The node whose source supplied the bytes.
    pub source_node_id: NodeId,
    /// The object's raw content.
    pub bytes: Vec<u8>,
    /// SHA-384 of `bytes`, computed at fetch time.
    pub computed_hash: FileHash,
}

impl CandidateFile {
    /// Builds a candidate, computing the content digest from the bytes.
    #[must_use]
    pub fn from_bytes(file_name: StreamFileName, source_node_id: NodeId, bytes: Vec<u8>) -> Self {
        let computed_hash = FileHash::digest_of(&bytes);
        Self {
            file_name,
            source_node_id,
            bytes,
            computed_hash,
        }
    }
}

/// A fully validated and promoted file, the unit handed downstream.
///
/// Its `hash` is the quorum-accepted digest and becomes the chain anchor for
/// the next file in chain-linked streams.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    /// The accepted filename.
    pub file_name: StreamFileName,
    /// The quorum-accepted content digest.
    pub hash: FileHash,
    /// Previous-hash field from the chained preamble, when the stream kind
    /// carries one.
    pub declared_previous_hash: Option<FileHash>,
    /// The accepted raw content.
    pub bytes: Vec<u8>,
}

/// Terminal outcome of processing a single candidate filename.
///
/// Expected failures are values, not errors: the pipeline loop branches on
/// this instead of catching exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Quorum reached, bytes matched, chain intact, cursor advanced.
    Accepted,
    /// No hash value was attested by a supermajority of known nodes.
    NoQuorum,
    /// Quorum named a hash but no agreeing node served matching bytes.
    Unverifiable,
    /// Declared previous hash broke the chain anchor; stream halts this cycle.
    ChainBroken,
    /// The durable cursor store failed; the run aborts without advancing.
    StoreFailure,
}

impl FileOutcome {
    /// Stable label for metrics and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FileOutcome::Accepted => "accepted",
            FileOutcome::NoQuorum => "no_quorum",
            FileOutcome::Unverifiable => "unverifiable",
            FileOutcome::ChainBroken => "chain_broken",
            FileOutcome::StoreFailure => "store_failure",
        }
    }

    /// True when this outcome stops processing of the stream kind for the
    /// remainder of the cycle.
    #[must_use]
    pub fn halts_cycle(&self) -> bool {
        matches!(self, FileOutcome::ChainBroken | FileOutcome::StoreFailure)
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLUSTER E: DURABLE STATE
// =============================================================================

/// Durable pointer to the last accepted file of one stream kind.
///
/// Mutated only after a file is fully validated and promoted; survives
/// process restart; never rolled back automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCursor {
    /// The stream this cursor tracks.
    pub stream_kind: StreamKind,
    /// Name of the last accepted file, `None` before the first acceptance.
    pub last_accepted_file_name: Option<StreamFileName>,
    /// Hash of the last accepted file; the chain anchor. `FileHash::EMPTY`
    /// before the first acceptance.
    pub last_accepted_hash: FileHash,
}

impl StreamCursor {
    /// A cursor that has never accepted a file.
    #[must_use]
    pub fn genesis(stream_kind: StreamKind) -> Self {
        Self {
            stream_kind,
            last_accepted_file_name: None,
            last_accepted_hash: FileHash::EMPTY,
        }
    }

    /// True before the first acceptance.
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.last_accepted_file_name.is_none()
    }
}
