//! # Integration Test Flows
//!
//! Whole-pipeline acceptance flows across multiple polling cycles: the
//! mirror catching up after downtime, quorum arriving late, chain halts
//! and the operator bypass, membership growth, and cursor durability
//! across a process restart.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::watch;

    use mirror_runtime::pipeline::CycleOutcome;
    use mirror_runtime::{MirrorConfig, MirrorContainer};
    use qm_03_stream_state::FileCursorStore;
    use shared_types::{FileHash, FileOutcome, StreamFileName, StreamKind, StreamProfile};

    use crate::support::{
        chained, fs_publish_everywhere, write_address_book, Cluster,
    };

    // =========================================================================
    // CATCH-UP AND RETRY
    // =========================================================================

    #[tokio::test]
    async fn test_catch_up_accepts_files_in_order() {
        let mut cluster = Cluster::new(&[1, 2, 3]);
        for (name, content) in [
            ("bal_000003.qbf", b"march".as_slice()),
            ("bal_000001.qbf", b"january".as_slice()),
            ("bal_000002.qbf", b"february".as_slice()),
        ] {
            cluster.publish_everywhere(StreamKind::Balance, name, content);
        }

        let report = cluster.run(&StreamProfile::balance()).await;

        assert_eq!(report.outcome, CycleOutcome::Completed);
        assert_eq!(report.accepted_count(), 3);
        // Ascending filename order regardless of publish order.
        assert_eq!(
            cluster.sink.delivered_names(),
            vec!["bal_000001.qbf", "bal_000002.qbf", "bal_000003.qbf"]
        );
        let cursor = cluster.cursor(StreamKind::Balance).await;
        assert_eq!(
            cursor.last_accepted_file_name,
            Some(StreamFileName::from("bal_000003.qbf"))
        );
    }

    #[tokio::test]
    async fn test_no_quorum_then_quorum_next_cycle() {
        let mut cluster = Cluster::new(&[1, 2, 3]);
        let content = b"late quorum snapshot";
        for node in [1, 2, 3] {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", content);
        }
        // Only two of three have signed so far; N=3 requires all 3.
        cluster.attest(1, StreamKind::Balance, "bal_000001.qbf", content);
        cluster.attest(2, StreamKind::Balance, "bal_000001.qbf", content);

        let first = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(
            first.processed,
            vec![(
                StreamFileName::from("bal_000001.qbf"),
                FileOutcome::NoQuorum
            )]
        );
        assert!(cluster.cursor(StreamKind::Balance).await.is_genesis());

        // The third signature lands; the next cycle retries the same file.
        cluster.attest(3, StreamKind::Balance, "bal_000001.qbf", content);
        let second = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(second.accepted_count(), 1);
        assert_eq!(cluster.sink.delivered_names(), vec!["bal_000001.qbf"]);
    }

    #[tokio::test]
    async fn test_resume_fetches_nothing_below_the_cursor() {
        let mut cluster = Cluster::new(&[1, 2, 3]);
        cluster.publish_everywhere(StreamKind::Balance, "bal_000001.qbf", b"one");
        cluster.publish_everywhere(StreamKind::Balance, "bal_000002.qbf", b"two");

        let first = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(first.accepted_count(), 2);
        let fetched_before: usize = (1..=3).map(|n| cluster.fetched_from(n).len()).sum();

        // Nothing new: the listing is empty past the cursor and no object
        // is fetched again.
        let second = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(second.outcome, CycleOutcome::Completed);
        assert!(second.processed.is_empty());
        let fetched_after: usize = (1..=3).map(|n| cluster.fetched_from(n).len()).sum();
        assert_eq!(fetched_before, fetched_after);
    }

    // =========================================================================
    // CHAIN HALTS AND THE OPERATOR BYPASS
    // =========================================================================

    #[tokio::test]
    async fn test_chain_break_halts_until_operator_sets_boundary() {
        let mut cluster = Cluster::new(&[1, 2, 3]);
        let first_bytes = chained(FileHash::EMPTY, b"records one");
        cluster.publish_everywhere(StreamKind::Record, "rcd_000001.qrs", &first_bytes);
        assert_eq!(cluster.run(&StreamProfile::record()).await.accepted_count(), 1);

        // The second file anchors on history this mirror never accepted.
        let foreign_anchor = FileHash::digest_of(b"a chain this mirror never saw");
        let second_bytes = chained(foreign_anchor, b"records two");
        cluster.publish_everywhere(StreamKind::Record, "rcd_000002.qrs", &second_bytes);

        // The halt repeats every cycle; the cursor never moves past it.
        for _ in 0..2 {
            let report = cluster.run(&StreamProfile::record()).await;
            assert_eq!(report.outcome, CycleOutcome::Halted);
            assert_eq!(
                report.processed,
                vec![(
                    StreamFileName::from("rcd_000002.qrs"),
                    FileOutcome::ChainBroken
                )]
            );
        }
        assert_eq!(
            cluster.cursor(StreamKind::Record).await.last_accepted_file_name,
            Some(StreamFileName::from("rcd_000001.qrs"))
        );
        assert_eq!(cluster.sink.delivered_names(), vec!["rcd_000001.qrs"]);

        // After investigating, the operator tolerates the discontinuity up
        // to and including the second file.
        let mut bypass = StreamProfile::record();
        bypass.bypass_boundary = Some(StreamFileName::from("rcd_000002.qrs"));
        assert_eq!(cluster.run(&bypass).await.accepted_count(), 1);

        // The third file chains off the second's real hash; the stream is
        // healthy again without any boundary.
        let third_bytes = chained(FileHash::digest_of(&second_bytes), b"records three");
        cluster.publish_everywhere(StreamKind::Record, "rcd_000003.qrs", &third_bytes);
        assert_eq!(cluster.run(&StreamProfile::record()).await.accepted_count(), 1);
        assert_eq!(
            cluster.sink.delivered_names(),
            vec!["rcd_000001.qrs", "rcd_000002.qrs", "rcd_000003.qrs"]
        );
    }

    // =========================================================================
    // MEMBERSHIP CHANGES
    // =========================================================================

    #[tokio::test]
    async fn test_membership_growth_raises_the_required_count() {
        let mut cluster = Cluster::new(&[1, 2, 3, 4, 5]);
        cluster.set_membership(&[1, 2, 3]);

        let content_one = b"during the three-node era";
        for node in [1, 2, 3] {
            cluster.publish(node, StreamKind::Balance, "bal_000001.qbf", content_one);
            cluster.attest(node, StreamKind::Balance, "bal_000001.qbf", content_one);
        }
        assert_eq!(cluster.run(&StreamProfile::balance()).await.accepted_count(), 1);

        // Two nodes join; floor(2*5/3)+1 = 4 agreeing nodes now needed.
        cluster.set_membership(&[1, 2, 3, 4, 5]);
        let content_two = b"during the five-node era";
        for node in [1, 2, 3, 4, 5] {
            cluster.publish(node, StreamKind::Balance, "bal_000002.qbf", content_two);
        }
        for node in [1, 2, 3] {
            cluster.attest(node, StreamKind::Balance, "bal_000002.qbf", content_two);
        }
        let report = cluster.run(&StreamProfile::balance()).await;
        assert_eq!(
            report.processed,
            vec![(
                StreamFileName::from("bal_000002.qbf"),
                FileOutcome::NoQuorum
            )]
        );

        cluster.attest(4, StreamKind::Balance, "bal_000002.qbf", content_two);
        assert_eq!(cluster.run(&StreamProfile::balance()).await.accepted_count(), 1);
    }

    // =========================================================================
    // DURABILITY ACROSS RESTARTS
    // =========================================================================

    #[tokio::test]
    async fn test_cursor_survives_process_restart() {
        let state_dir = tempfile::tempdir().unwrap();
        let first_bytes = chained(FileHash::EMPTY, b"before the restart");

        {
            let store = Arc::new(FileCursorStore::open(state_dir.path()).unwrap());
            let mut cluster = Cluster::with_store(&[1, 2, 3], store);
            cluster.publish_everywhere(StreamKind::Record, "rcd_000001.qrs", &first_bytes);
            assert_eq!(cluster.run(&StreamProfile::record()).await.accepted_count(), 1);
        }

        // A new process opens the same state directory. The second file
        // chains off the first's hash, which only the durable cursor knows.
        let store = Arc::new(FileCursorStore::open(state_dir.path()).unwrap());
        let mut cluster = Cluster::with_store(&[1, 2, 3], store);
        cluster.publish_everywhere(StreamKind::Record, "rcd_000001.qrs", &first_bytes);
        let second_bytes = chained(FileHash::digest_of(&first_bytes), b"after the restart");
        cluster.publish_everywhere(StreamKind::Record, "rcd_000002.qrs", &second_bytes);

        let report = cluster.run(&StreamProfile::record()).await;
        assert_eq!(
            report.processed,
            vec![(
                StreamFileName::from("rcd_000002.qrs"),
                FileOutcome::Accepted
            )]
        );
    }

    // =========================================================================
    // END TO END OVER THE REAL ADAPTERS
    // =========================================================================

    #[tokio::test]
    async fn test_end_to_end_over_filesystem_adapters() {
        let base = tempfile::tempdir().unwrap();
        let config = MirrorConfig::for_testing(base.path());
        let ids = [1, 2, 3];
        write_address_book(&config.registry.address_book_path, &ids);

        let balance_bytes = b"account balances".as_slice();
        fs_publish_everywhere(
            &config.sources.root_dir,
            &ids,
            StreamKind::Balance,
            "bal_000001.qbf",
            balance_bytes,
        );
        let record_bytes = chained(FileHash::EMPTY, b"record batch");
        fs_publish_everywhere(
            &config.sources.root_dir,
            &ids,
            StreamKind::Record,
            "rcd_000001.qrs",
            &record_bytes,
        );

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let container = MirrorContainer::build(config, shutdown_rx).await.unwrap();

        for profile in container.config.enabled_profiles() {
            let report = container.pipeline.run_once(&profile).await.unwrap();
            assert_eq!(report.accepted_count(), 1, "stream {:?}", profile.kind);
        }

        let archived_balance = std::fs::read(
            container
                .config
                .storage
                .data_dir
                .join("balance")
                .join("bal_000001.qbf"),
        )
        .unwrap();
        assert_eq!(archived_balance, balance_bytes);
        let archived_record = std::fs::read(
            container
                .config
                .storage
                .data_dir
                .join("record")
                .join("rcd_000001.qrs"),
        )
        .unwrap();
        assert_eq!(archived_record, record_bytes);

        let cursor = container.pipeline.status(StreamKind::Record).await.unwrap();
        assert_eq!(
            cursor.last_accepted_hash,
            FileHash::digest_of(&record_bytes)
        );
    }
}
