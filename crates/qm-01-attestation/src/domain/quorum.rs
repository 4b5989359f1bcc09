//! # Quorum Resolution
//!
//! Groups verified claims by claimed hash and decides whether one hash is
//! attested by a strict supermajority of all known nodes.
//!
//! The threshold counts against the full registry, not the responders: ten
//! known nodes need eight agreeing even if only eight responded.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use shared_types::{FileHash, NodeId, SignatureClaim, StreamFileName};

/// Number of distinct agreeing nodes required for acceptance.
///
/// Strict supermajority: the count must exceed `floor(2N/3)`, so the
/// requirement is `floor(2N/3) + 1`. For N=3 that is all 3 nodes, for N=4
/// it is 3, for N=7 it is 5, for N=10 it is 7. N=1 requires 1 and N=2
/// requires 2, so degenerate networks still need every node.
#[must_use]
pub fn required_agreement(total_nodes: usize) -> usize {
    (total_nodes * 2) / 3 + 1
}

/// The outcome of quorum resolution for one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuorumDecision {
    /// One hash is attested by a strict supermajority of known nodes.
    Accepted {
        /// The winning content digest.
        accepted_hash: FileHash,
        /// The nodes that attested to it, ascending by id. This is the
        /// candidate order for the subsequent data fetch.
        agreeing_node_ids: BTreeSet<NodeId>,
    },
    /// No hash reached the threshold. Expected and recoverable; the file is
    /// retried next cycle with fresh claims.
    NoQuorum {
        /// Distinct nodes that produced any eligible claim.
        distinct_claimants: usize,
        /// Agreeing nodes that would have been required.
        required: usize,
    },
}

/// Quorum resolution result for one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumResult {
    /// The filename the claims were about.
    pub file_name: StreamFileName,
    /// The decision.
    pub decision: QuorumDecision,
}

impl QuorumResult {
    /// True when a hash was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self.decision, QuorumDecision::Accepted { .. })
    }
}

/// Resolves quorum over verified claims for one filename.
///
/// Callers must pass only claims that already passed signature
/// verification; unverified claims would let a forger vote.
///
/// Counting rules:
/// - one vote per distinct node id; a second claim from the same node is
///   ignored, whatever hash it names
/// - a hash wins with strictly more than `2 * total_nodes / 3` distinct
///   votes
/// - if the distinct claimants across all hashes cannot reach the
///   threshold, resolution short-circuits to `NoQuorum` without grouping
/// - should two hashes ever reach the threshold together, resolution fails
///   closed with `NoQuorum` rather than guessing
pub fn resolve(
    file_name: StreamFileName,
    claims: &[SignatureClaim],
    total_nodes: usize,
) -> QuorumResult {
    let required = required_agreement(total_nodes);

    // One vote per node: first claim wins, later ones are ignored.
    let mut votes: BTreeMap<NodeId, FileHash> = BTreeMap::new();
    for claim in claims {
        votes.entry(claim.node_id).or_insert(claim.claimed_hash);
    }

    // An empty registry can vouch for nothing, whatever was claimed.
    if total_nodes == 0 {
        return QuorumResult {
            file_name,
            decision: QuorumDecision::NoQuorum {
                distinct_claimants: votes.len(),
                required,
            },
        };
    }

    // Sparse sets cannot reach quorum whatever the grouping.
    if votes.len() < required {
        return QuorumResult {
            file_name,
            decision: QuorumDecision::NoQuorum {
                distinct_claimants: votes.len(),
                required,
            },
        };
    }

    let mut groups: HashMap<FileHash, BTreeSet<NodeId>> = HashMap::new();
    for (node_id, hash) in &votes {
        groups.entry(*hash).or_default().insert(*node_id);
    }

    let mut winners: Vec<(FileHash, BTreeSet<NodeId>)> = groups
        .into_iter()
        .filter(|(_, nodes)| nodes.len() >= required)
        .collect();

    match winners.len() {
        1 => {
            let (accepted_hash, agreeing_node_ids) = winners.remove(0);
            QuorumResult {
                file_name,
                decision: QuorumDecision::Accepted {
                    accepted_hash,
                    agreeing_node_ids,
                },
            }
        }
        // Zero winners, or the defensive multi-winner case: fail closed.
        _ => QuorumResult {
            file_name,
            decision: QuorumDecision::NoQuorum {
                distinct_claimants: votes.len(),
                required,
            },
        },
    }
}
