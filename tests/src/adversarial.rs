//! # Adversarial Scenarios
//!
//! Byzantine behavior the supermajority rule must absorb: forged
//! signatures, stale keys after rotation, minority collusion on a false
//! hash, nodes serving bytes that do not match their own attestation,
//! and outsiders flooding claims without being in the registry.

#[cfg(test)]
mod tests {
    use mirror_runtime::pipeline::CycleOutcome;
    use shared_types::{
        FileHash, FileOutcome, NodeId, NodeIdentity, StreamFileName, StreamKind, StreamProfile,
    };

    use crate::support::{identity, signing_key, Cluster};

    #[tokio::test]
    async fn test_forged_signatures_never_count() {
        let mut cluster = Cluster::new(&[1, 2, 3]);
        let content = b"the real snapshot";
        for node in [1, 2, 3] {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", content);
        }
        cluster.attest(1, StreamKind::Balance, "bal_000001.qbf", content);
        // Nodes 2 and 3 present envelopes signed with a key the registry
        // does not associate with them.
        let foreign = signing_key(99);
        cluster.attest_with_key(2, StreamKind::Balance, "bal_000001.qbf", content, &foreign);
        cluster.attest_with_key(3, StreamKind::Balance, "bal_000001.qbf", content, &foreign);

        let report = cluster.run(&StreamProfile::balance()).await;

        // One valid vote out of three known nodes: no quorum, no accept.
        assert_eq!(
            report.processed,
            vec![(
                StreamFileName::from("bal_000001.qbf"),
                FileOutcome::NoQuorum
            )]
        );
        assert!(cluster.sink.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_stale_key_after_rotation_is_an_invalid_vote() {
        let mut cluster = Cluster::new(&[1, 2, 3]);
        let content = b"post-rotation snapshot";
        cluster.publish_everywhere(StreamKind::Balance, "bal_000001.qbf", content);

        // Node 3 rotated its key in the address book but still signs with
        // the old one; its vote no longer verifies.
        let old_key = signing_key(3);
        let rotated = signing_key(33);
        cluster.registry.set_identities(vec![
            identity(1),
            identity(2),
            NodeIdentity {
                id: NodeId(3),
                public_key: rotated.verifying_key().to_bytes(),
            },
        ]);
        cluster.attest_with_key(3, StreamKind::Balance, "bal_000001.qbf", content, &old_key);

        let first = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(first.accepted_count(), 0);

        // Once node 3 signs with the rotated key, the next cycle accepts.
        cluster.attest_with_key(3, StreamKind::Balance, "bal_000001.qbf", content, &rotated);
        let second = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(second.accepted_count(), 1);
    }

    #[tokio::test]
    async fn test_minority_collusion_cannot_force_a_false_file() {
        // Seven nodes; floor(2*7/3)+1 = 5 agreeing nodes required.
        let ids: Vec<u64> = (1..=7).collect();
        let mut cluster = Cluster::new(&ids);
        let honest = b"what the network agreed on".as_slice();
        let forged = b"what two colluders wish happened".as_slice();

        for node in 1..=5 {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", honest);
            cluster.attest(node, StreamKind::Balance, "bal_000001.qbf", honest);
        }
        for node in 6..=7 {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", forged);
            cluster.attest(node, StreamKind::Balance, "bal_000001.qbf", forged);
        }

        let report = cluster.run(&StreamProfile::balance()).await;

        // The honest hash wins; the colluders' bytes are never delivered.
        assert_eq!(report.accepted_count(), 1);
        let delivered = cluster.sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].1.bytes, honest);
        assert_eq!(delivered[0].1.hash, FileHash::digest_of(honest));
    }

    #[tokio::test]
    async fn test_split_vote_below_threshold_accepts_nothing() {
        // Five nodes; 3 attest one hash, 2 another. Neither reaches 4.
        let mut cluster = Cluster::new(&[1, 2, 3, 4, 5]);
        let version_a = b"candidate history A".as_slice();
        let version_b = b"candidate history B".as_slice();

        for node in 1..=3 {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", version_a);
            cluster.attest(node, StreamKind::Balance, "bal_000001.qbf", version_a);
        }
        for node in 4..=5 {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", version_b);
            cluster.attest(node, StreamKind::Balance, "bal_000001.qbf", version_b);
        }

        let report = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(
            report.processed,
            vec![(
                StreamFileName::from("bal_000001.qbf"),
                FileOutcome::NoQuorum
            )]
        );
        assert!(cluster.cursor(StreamKind::Balance).await.is_genesis());
    }

    #[tokio::test]
    async fn test_node_serving_bytes_it_did_not_attest_is_skipped() {
        let mut cluster = Cluster::new(&[1, 2, 3]);
        let good = b"bytes matching the quorum hash".as_slice();
        let bad = b"corrupted or substituted bytes".as_slice();

        // Everyone attests the good hash, but node 1 (tried first) serves
        // something else.
        cluster.publish(1, StreamKind::Balance, "bal_000001.qbf", bad);
        cluster.publish(2, StreamKind::Balance, "bal_000001.qbf", good);
        cluster.publish(3, StreamKind::Balance, "bal_000001.qbf", good);
        for node in [1, 2, 3] {
            cluster.attest(node, StreamKind::Balance, "bal_000001.qbf", good);
        }

        let report = cluster.run(&StreamProfile::balance()).await;

        assert_eq!(report.accepted_count(), 1);
        let delivered = cluster.sink.delivered();
        assert_eq!(delivered[0].1.bytes, good);
        // Node 1 was tried for the data object, node 2 supplied the match,
        // node 3 was never asked for data.
        let node3_fetches = cluster.fetched_from(3);
        assert_eq!(
            node3_fetches
                .iter()
                .filter(|name| *name == "bal_000001.qbf")
                .count(),
            0
        );
    }

    #[tokio::test]
    async fn test_outsiders_flooding_claims_cannot_vote() {
        // Sources exist for five machines, but the registry only knows
        // three. The two outsiders attest enthusiastically.
        let mut cluster = Cluster::new(&[1, 2, 3, 8, 9]);
        cluster.set_membership(&[1, 2, 3]);
        let content = b"outsiders want this accepted".as_slice();

        for node in [1, 8, 9] {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", content);
            cluster.attest(node, StreamKind::Balance, "bal_000001.qbf", content);
        }

        let report = cluster.run(&StreamProfile::balance()).await;

        // One known vote plus two abstentions: nothing accepted.
        assert_eq!(
            report.processed,
            vec![(
                StreamFileName::from("bal_000001.qbf"),
                FileOutcome::NoQuorum
            )]
        );
        assert_eq!(report.outcome, CycleOutcome::Completed);
        assert!(cluster.sink.delivered().is_empty());
    }
}
