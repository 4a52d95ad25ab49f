//! Integration test: submission through sealing to verified inclusion.
//!
//! Exercises the registry node, the batch engine, and consumer-side
//! Merkle verification together.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pohw_core::{BatchConfig, ContentHash, ProofRecord, RegistryConfig};
use pohw_crypto::{hash_hex, sign, KeyPair};
use pohw_ledger::{verify_inclusion, BatchEngine};
use pohw_registry::{spawn_sealer, RegistryNode};
use pohw_store::MemoryStore;

fn node(threshold: usize) -> RegistryNode {
    pohw_integration_tests::init_tracing();
    RegistryNode::new(RegistryConfig {
        batch: BatchConfig {
            threshold,
            interval_secs: 3600,
        },
        ..RegistryConfig::default()
    })
}

fn content(n: u8) -> ContentHash {
    ContentHash::new(hash_hex(&[n])).unwrap()
}

#[test]
fn test_five_proofs_sealed_and_third_verifies() {
    let node = node(100);
    let kp = KeyPair::generate();
    let did = node.identity().register(&kp.public_key()).unwrap().did;

    for n in 1..=5u8 {
        let hash = content(n);
        let sig = sign(&hash.to_bytes().unwrap(), &kp).to_hex();
        let outcome = node.submit_proof(&did, hash, &sig, None).unwrap();
        assert!(outcome.accepted);
    }
    let batch = node.ledger().create_batch().unwrap().unwrap();
    assert_eq!(batch.size, 5);

    // The third submission sits at merkle index 2 and verifies against the
    // sealed root with nothing but the proof steps.
    let third = content(3);
    let inclusion = node.ledger().merkle_proof(&third).unwrap().unwrap();
    assert_eq!(inclusion.merkle_index, 2);
    assert!(verify_inclusion(
        &third.to_bytes().unwrap(),
        &inclusion.steps,
        &batch.root.to_bytes().unwrap()
    ));
}

#[test]
fn test_inclusion_round_trips_across_odd_and_even_sizes() {
    for size in [1u8, 2, 3, 5, 6, 7] {
        let engine = BatchEngine::new(
            Arc::new(MemoryStore::new()),
            BatchConfig {
                threshold: 100,
                interval_secs: 3600,
            },
        );
        for n in 1..=size {
            engine
                .submit(ProofRecord {
                    hash: content(n),
                    signature: "00".repeat(64),
                    author_did: pohw_core::Did::from_identifier(&"aa".repeat(16)),
                    timestamp: Utc::now(),
                    batch_id: None,
                    merkle_index: None,
                    process_digest: None,
                    tier: None,
                })
                .unwrap();
        }
        let batch = engine.create_batch().unwrap().unwrap();
        let root = batch.root.to_bytes().unwrap();
        for n in 1..=size {
            let hash = content(n);
            let inclusion = engine.merkle_proof(&hash).unwrap().unwrap();
            assert!(
                verify_inclusion(&hash.to_bytes().unwrap(), &inclusion.steps, &root),
                "leaf {} of {} failed to verify",
                n,
                size
            );
        }
    }
}

#[test]
fn test_sealed_batch_immutable_under_later_activity() {
    let node = node(100);
    let kp = KeyPair::generate();
    let did = node.identity().register(&kp.public_key()).unwrap().did;

    for n in 1..=3u8 {
        let hash = content(n);
        let sig = sign(&hash.to_bytes().unwrap(), &kp).to_hex();
        node.submit_proof(&did, hash, &sig, None).unwrap();
    }
    let first = node.ledger().create_batch().unwrap().unwrap();

    for n in 10..=12u8 {
        let hash = content(n);
        let sig = sign(&hash.to_bytes().unwrap(), &kp).to_hex();
        node.submit_proof(&did, hash, &sig, None).unwrap();
    }
    let second = node.ledger().create_batch().unwrap().unwrap();
    assert_ne!(first.id, second.id);

    let reread = node.ledger().get_batch(&first.id).unwrap();
    assert_eq!(reread.root, first.root);
    assert_eq!(reread.size, first.size);
}

#[test]
fn test_duplicate_hash_rejected_across_batches() {
    let node = node(100);
    let kp = KeyPair::generate();
    let did = node.identity().register(&kp.public_key()).unwrap().did;

    let hash = content(1);
    let sig = sign(&hash.to_bytes().unwrap(), &kp).to_hex();
    node.submit_proof(&did, hash.clone(), &sig, None).unwrap();
    node.ledger().create_batch().unwrap().unwrap();

    assert!(node.submit_proof(&did, hash, &sig, None).is_err());
}

#[tokio::test]
async fn test_background_sealer_end_to_end() {
    let engine = Arc::new(BatchEngine::new(
        Arc::new(MemoryStore::new()),
        BatchConfig {
            threshold: 3,
            interval_secs: 3600,
        },
    ));
    let handle = spawn_sealer(engine.clone(), Duration::from_millis(5));

    for n in 1..=3u8 {
        engine
            .submit(ProofRecord {
                hash: content(n),
                signature: "00".repeat(64),
                author_did: pohw_core::Did::from_identifier(&"bb".repeat(16)),
                timestamp: Utc::now(),
                batch_id: None,
                merkle_index: None,
                process_digest: None,
                tier: None,
            })
            .unwrap();
    }

    let mut sealed = false;
    for _ in 0..200 {
        if engine.merkle_proof(&content(1)).unwrap().is_some() {
            sealed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    handle.shutdown().await;
    assert!(sealed, "sealer never sealed the full queue");
}
