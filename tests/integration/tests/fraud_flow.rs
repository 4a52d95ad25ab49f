//! Integration test: fraud mitigation under a submission flood.

use pohw_core::{ContentHash, FraudConfig, ProcessDigest, RegistryConfig, TrustTier};
use pohw_crypto::{hash_hex, sign, KeyPair};
use pohw_registry::{RegistryNode, SubmissionOutcome};

fn node(config: RegistryConfig) -> RegistryNode {
    pohw_integration_tests::init_tracing();
    RegistryNode::new(config)
}

fn content(n: u16) -> ContentHash {
    ContentHash::new(hash_hex(&n.to_be_bytes())).unwrap()
}

fn submit(
    node: &RegistryNode,
    did: &pohw_core::Did,
    kp: &KeyPair,
    n: u16,
    digest: Option<ProcessDigest>,
) -> SubmissionOutcome {
    let hash = content(n);
    let sig = sign(&hash.to_bytes().unwrap(), kp).to_hex();
    node.submit_proof(did, hash, &sig, digest).unwrap()
}

#[test]
fn test_flood_trips_ceiling_at_sixty_one() {
    let node = node(RegistryConfig::default());
    let kp = KeyPair::generate();
    let did = node.identity().register(&kp.public_key()).unwrap().did;

    for n in 0..60u16 {
        let outcome = submit(&node, &did, &kp, n, None);
        assert!(outcome.accepted, "submission {} should pass", n);
    }
    let outcome = submit(&node, &did, &kp, 60, None);
    assert!(!outcome.accepted);
    assert_eq!(outcome.decision.current_rate, 61);
    assert!(outcome
        .decision
        .reason
        .as_ref()
        .unwrap()
        .contains("ceiling"));

    // Only the 60 accepted proofs are queued; the anomaly is on record and
    // the score took the penalty.
    assert_eq!(node.ledger().pending_len(), 60);
    let reputation = node.fraud().get_reputation(&did).unwrap().unwrap();
    assert_eq!(reputation.anomalies, 1);
    assert_eq!(reputation.successful_proofs, 60);
    assert!(node.fraud().has_recent_anomalies(&did, 1).unwrap());
}

#[test]
fn test_entropy_collapse_flagged_after_baseline() {
    let node = node(RegistryConfig {
        fraud: FraudConfig {
            rate_ceiling: 1000,
            ..FraudConfig::default()
        },
        ..RegistryConfig::default()
    });
    let kp = KeyPair::generate();
    let did = node.identity().register(&kp.public_key()).unwrap().did;

    let steady = ProcessDigest {
        entropy: 4.1,
        event_count: 800,
    };
    for n in 0..5u16 {
        let outcome = submit(&node, &did, &kp, n, Some(steady));
        assert!(outcome.accepted);
    }

    let implausible = ProcessDigest {
        entropy: 0.3,
        event_count: 4,
    };
    let outcome = submit(&node, &did, &kp, 100, Some(implausible));
    assert!(!outcome.accepted);
    assert!(outcome.decision.entropy_discrepancy.unwrap() > 0.3);

    let reputation = node.fraud().get_reputation(&did).unwrap().unwrap();
    assert_eq!(reputation.anomalies, 1);
}

#[test]
fn test_clean_history_raises_score_within_bounds() {
    let node = node(RegistryConfig::default());
    let kp = KeyPair::generate();
    let did = node.identity().register(&kp.public_key()).unwrap().did;

    let initial = node.config().reputation.initial_score;
    let mut last = submit(&node, &did, &kp, 0, None);
    assert!(last.accepted);
    for n in 1..5u16 {
        last = submit(&node, &did, &kp, n, None);
    }
    let reputation = node.fraud().get_reputation(&did).unwrap().unwrap();
    assert!(reputation.score > initial);
    assert!(reputation.score <= 100.0);
    assert_eq!(last.tier, reputation.tier);
}

#[test]
fn test_recent_anomaly_caps_effective_tier() {
    let node = node(RegistryConfig {
        fraud: FraudConfig {
            rate_ceiling: 1,
            ..FraudConfig::default()
        },
        ..RegistryConfig::default()
    });
    let kp = KeyPair::generate();
    let did = node.identity().register(&kp.public_key()).unwrap().did;

    submit(&node, &did, &kp, 0, None);
    let denied = submit(&node, &did, &kp, 1, None);
    assert!(!denied.accepted);
    assert!(denied
        .decision
        .reason
        .as_ref()
        .unwrap()
        .starts_with("rate"));

    assert!(node.fraud().has_recent_anomalies(&did, 24).unwrap());
    let tier = node.effective_tier(&did, &[]).unwrap();
    assert!(tier.rank() <= TrustTier::Purple.rank());
}
