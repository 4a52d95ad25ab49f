//! Integration test: identity rotation with continued submissions.
//!
//! A registered author keeps submitting across a key rotation; the
//! continuity claim verifies independently and the old key is retired.

use pohw_core::{ContentHash, RegistryConfig};
use pohw_crypto::{hash_hex, sign, KeyPair};
use pohw_identity::{verify_claim, IdentityError};
use pohw_registry::{RegistryError, RegistryNode};

fn node() -> RegistryNode {
    pohw_integration_tests::init_tracing();
    RegistryNode::new(RegistryConfig::default())
}

fn content(n: u8) -> ContentHash {
    ContentHash::new(hash_hex(&[n])).unwrap()
}

fn submit(node: &RegistryNode, did: &pohw_core::Did, kp: &KeyPair, n: u8) -> Result<bool, RegistryError> {
    let hash = content(n);
    let sig = sign(&hash.to_bytes().unwrap(), kp).to_hex();
    node.submit_proof(did, hash, &sig, None).map(|o| o.accepted)
}

#[test]
fn test_rotation_preserves_submission_ability() {
    let node = node();
    let old_kp = KeyPair::generate();
    let new_kp = KeyPair::generate();

    let old_did = node.identity().register(&old_kp.public_key()).unwrap().did;
    assert!(submit(&node, &old_did, &old_kp, 1).unwrap());

    let outcome = node
        .identity()
        .rotate(&old_did, &old_kp, &new_kp, Some("batch-ref".into()))
        .unwrap();

    // The claim stands on its own for any verifier holding the two keys.
    verify_claim(
        &outcome.claim,
        &old_kp.public_key(),
        &new_kp.public_key(),
        &outcome.new_did,
    )
    .unwrap();

    // Old identity is retired, the successor carries on.
    assert!(matches!(
        submit(&node, &old_did, &old_kp, 2),
        Err(RegistryError::InactiveIdentity { .. })
    ));
    assert!(submit(&node, &outcome.new_did, &new_kp, 3).unwrap());

    let chain = node.identity().continuity_chain(&outcome.new_did).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].did, old_did);
    assert_eq!(chain[1].did, outcome.new_did);
}

#[test]
fn test_tampered_claim_rejected() {
    let node = node();
    let old_kp = KeyPair::generate();
    let new_kp = KeyPair::generate();
    let old_did = node.identity().register(&old_kp.public_key()).unwrap().did;
    let outcome = node
        .identity()
        .rotate(&old_did, &old_kp, &new_kp, None)
        .unwrap();

    let mut forged = outcome.claim.clone();
    forged.parent_reference = "00".repeat(32);
    assert!(matches!(
        verify_claim(
            &forged,
            &old_kp.public_key(),
            &new_kp.public_key(),
            &outcome.new_did,
        ),
        Err(IdentityError::ContinuityVerification { .. })
    ));

    let mut swapped = outcome.claim.clone();
    swapped.succession_signature = "ff".repeat(32);
    assert!(matches!(
        verify_claim(
            &swapped,
            &old_kp.public_key(),
            &new_kp.public_key(),
            &outcome.new_did,
        ),
        Err(IdentityError::ContinuityVerification { .. })
    ));
}

#[test]
fn test_long_chain_stays_acyclic() {
    let node = node();
    let mut keys = vec![KeyPair::generate()];
    let mut dids = vec![node.identity().register(&keys[0].public_key()).unwrap().did];

    for _ in 0..4 {
        let next = KeyPair::generate();
        let outcome = node
            .identity()
            .rotate(dids.last().unwrap(), keys.last().unwrap(), &next, None)
            .unwrap();
        keys.push(next);
        dids.push(outcome.new_did);
    }

    let chain = node.identity().continuity_chain(dids.last().unwrap()).unwrap();
    assert_eq!(chain.len(), 5);
    let walked: Vec<_> = chain.iter().map(|n| n.did.clone()).collect();
    assert_eq!(walked, dids);

    // Rotating back onto the chain's first key would close a cycle.
    assert!(matches!(
        node.identity()
            .rotate(dids.last().unwrap(), keys.last().unwrap(), &keys[0], None),
        Err(IdentityError::CycleDetected(_))
    ));
}

#[test]
fn test_revocation_terminal_but_history_survives() {
    let node = node();
    let kp1 = KeyPair::generate();
    let kp2 = KeyPair::generate();
    let d1 = node.identity().register(&kp1.public_key()).unwrap().did;
    let d2 = node.identity().rotate(&d1, &kp1, &kp2, None).unwrap().new_did;

    node.identity()
        .revoke(&d2, Some("device stolen".into()))
        .unwrap();
    assert!(matches!(
        node.identity().rotate(&d2, &kp2, &KeyPair::generate(), None),
        Err(IdentityError::Revoked(_))
    ));
    assert!(matches!(
        submit(&node, &d2, &kp2, 1),
        Err(RegistryError::InactiveIdentity { .. })
    ));

    let chain = node.identity().continuity_chain(&d2).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(
        chain[1].status_reason.as_deref(),
        Some("device stolen")
    );
}
