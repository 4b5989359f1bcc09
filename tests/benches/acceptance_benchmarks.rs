//! # Quorum-Mirror Acceptance Benchmarks
//!
//! Hot paths of a polling cycle:
//!
//! | Stage | Work | Target |
//! |-------|------|--------|
//! | Content hashing | SHA-384 over full candidate bytes | throughput-bound |
//! | Claim verification | one Ed25519 verify per claim | < 1ms |
//! | Quorum resolution | one pass over verified claims | < 1ms |
//! | Envelope parsing | fixed-layout decode per signature object | < 1us |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ed25519_dalek::{Signer, SigningKey};

use qm_01_attestation::{verify_claim, AttestationApi, AttestationService};
use shared_types::{FileHash, NodeId, SignatureClaim, SignatureEnvelope, StreamFileName};

fn claim_for(node: u64, hash: FileHash) -> (SignatureClaim, [u8; 32]) {
    let key = SigningKey::from_bytes(&[node as u8; 32]);
    let signature = key.sign(&hash.0);
    (
        SignatureClaim {
            node_id: NodeId(node),
            file_name: StreamFileName::from("bal_000001.qbf"),
            claimed_hash: hash,
            raw_signature: signature.to_bytes().to_vec(),
        },
        key.verifying_key().to_bytes(),
    )
}

// ============================================================================
// Content hashing: every fetched candidate is re-hashed locally
// ============================================================================

fn bench_content_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("content-hashing");
    for size in [64 * 1024, 1024 * 1024, 8 * 1024 * 1024] {
        let bytes = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("sha384_digest", size),
            &bytes,
            |b, bytes| b.iter(|| black_box(FileHash::digest_of(bytes))),
        );
    }
    group.finish();
}

// ============================================================================
// Claim verification: one Ed25519 verify per collected signature object
// ============================================================================

fn bench_claim_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("claim-verification");
    group.measurement_time(Duration::from_secs(10));

    let hash = FileHash::digest_of(b"benchmark artifact");
    let (claim, key) = claim_for(1, hash);
    group.bench_function("ed25519_verify_single", |b| {
        b.iter(|| black_box(verify_claim(&claim, &key).is_ok()))
    });
    group.finish();
}

// ============================================================================
// Quorum resolution: grouping and threshold math over verified claims
// ============================================================================

fn bench_quorum_resolution(c: &mut Criterion) {
    let service = AttestationService::new();
    let hash = FileHash::digest_of(b"benchmark artifact");

    let mut group = c.benchmark_group("quorum-resolution");
    for nodes in [10usize, 50, 100] {
        let claims: Vec<SignatureClaim> =
            (1..=nodes as u64).map(|n| claim_for(n, hash).0).collect();
        group.bench_with_input(BenchmarkId::new("resolve", nodes), &claims, |b, claims| {
            b.iter(|| {
                black_box(service.resolve_quorum(
                    StreamFileName::from("bal_000001.qbf"),
                    claims,
                    claims.len(),
                ))
            })
        });
    }
    group.finish();
}

// ============================================================================
// Envelope parsing: fixed-layout decode of one signature object
// ============================================================================

fn bench_envelope_parse(c: &mut Criterion) {
    let hash = FileHash::digest_of(b"benchmark artifact");
    let key = SigningKey::from_bytes(&[7u8; 32]);
    let encoded = SignatureEnvelope {
        claimed_hash: hash,
        signature: key.sign(&hash.0).to_bytes().to_vec(),
    }
    .encode();

    c.bench_function("envelope_parse", |b| {
        b.iter(|| black_box(SignatureEnvelope::parse(&encoded).is_ok()))
    });
}

criterion_group!(
    benches,
    bench_content_hashing,
    bench_claim_verification,
    bench_quorum_resolution,
    bench_envelope_parse
);
criterion_main!(benches);
