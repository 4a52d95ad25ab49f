//! Integration test: attestor accreditation, credentials, and policies.

use chrono::Utc;
use pohw_core::{
    AssuranceLevel, AttestorKind, AuditAction, Did, RegistryConfig, ReviewMethod, TrustTier,
};
use pohw_registry::RegistryNode;

fn node() -> RegistryNode {
    pohw_integration_tests::init_tracing();
    RegistryNode::new(RegistryConfig::default())
}

fn did(n: u8) -> Did {
    Did::from_identifier(&format!("{:02x}", n).repeat(16))
}

fn activate(node: &RegistryNode, n: u8, kind: AttestorKind) -> Did {
    let attestor = did(n);
    node.attestors()
        .register_attestor(
            attestor.clone(),
            format!("attestor-{}", n),
            kind,
            "ee".repeat(32),
            None,
            None,
        )
        .unwrap();
    node.attestors().approve_attestor(&attestor, None).unwrap();
    attestor
}

#[test]
fn test_credential_revocation_with_audit_trail() {
    let node = node();
    let attestor = activate(&node, 1, AttestorKind::Organization);
    let subject = did(7);

    let vc = node
        .attestors()
        .issue_credential(
            &attestor,
            &subject,
            ReviewMethod::LiveSession,
            AssuranceLevel::High,
            None,
            None,
        )
        .unwrap();
    assert!(node
        .attestors()
        .is_credential_valid(&vc.credential_hash)
        .unwrap());

    node.attestors()
        .revoke_credential(&vc.credential_hash, &attestor, "compromised")
        .unwrap();
    assert!(!node
        .attestors()
        .is_credential_valid(&vc.credential_hash)
        .unwrap());

    // A second revocation fails and the first record stands.
    assert!(node
        .attestors()
        .revoke_credential(&vc.credential_hash, &attestor, "again")
        .is_err());

    let trail = node.attestors().audit_logs(Some(&attestor), None).unwrap();
    let actions: Vec<AuditAction> = trail.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::AttestorRegistered,
            AuditAction::AttestorApproved,
            AuditAction::CredentialIssued,
            AuditAction::CredentialRevoked,
        ]
    );
    assert_eq!(trail[3].details["reason"], "compromised");
}

#[test]
fn test_suspension_invalidates_outstanding_credentials() {
    let node = node();
    let attestor = activate(&node, 1, AttestorKind::Organization);
    let subject = did(7);

    let vc = node
        .attestors()
        .issue_credential(
            &attestor,
            &subject,
            ReviewMethod::DocumentReview,
            AssuranceLevel::Standard,
            None,
            None,
        )
        .unwrap();

    node.attestors()
        .suspend_attestor(&attestor, "audit overdue")
        .unwrap();
    assert!(!node
        .attestors()
        .is_credential_valid(&vc.credential_hash)
        .unwrap());
    // A suspended attestor cannot issue either.
    assert!(node
        .attestors()
        .issue_credential(
            &attestor,
            &subject,
            ReviewMethod::ProcessAudit,
            AssuranceLevel::Basic,
            None,
            None,
        )
        .is_err());

    // Re-approval restores both.
    node.attestors().approve_attestor(&attestor, None).unwrap();
    assert!(node
        .attestors()
        .is_credential_valid(&vc.credential_hash)
        .unwrap());
}

#[test]
fn test_multi_attestor_policy_distinct_count() {
    let node = node();
    let subject = did(7);
    let a = activate(&node, 1, AttestorKind::Organization);
    let b = activate(&node, 2, AttestorKind::Individual);

    let from = |attestor: &Did, method: ReviewMethod| {
        node.attestors()
            .issue_credential(
                attestor,
                &subject,
                method,
                AssuranceLevel::Standard,
                None,
                None,
            )
            .unwrap()
            .credential_hash
    };

    // Two credentials from one attestor do not satisfy "green".
    let one = from(&a, ReviewMethod::DocumentReview);
    let same = from(&a, ReviewMethod::LiveSession);
    let outcome = node
        .attestors()
        .verify_multi_attestor_policy(&subject, "green", &[one.clone(), same])
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(
        outcome.reason.as_deref(),
        Some("insufficient distinct attestors: 1 < 2")
    );

    // A second distinct attestor tips it over.
    let other = from(&b, ReviewMethod::DocumentReview);
    let outcome = node
        .attestors()
        .verify_multi_attestor_policy(&subject, "green", &[one.clone(), other.clone()])
        .unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.details.distinct_attestors, 2);

    // And lifts the subject's effective tier to green.
    assert_eq!(
        node.effective_tier(&subject, &[one, other]).unwrap(),
        TrustTier::Green
    );
}

#[test]
fn test_foundation_override_and_expiry() {
    let node = node();
    let issuer = activate(&node, 1, AttestorKind::Organization);
    let foundation = activate(&node, 2, AttestorKind::Foundation);
    let subject = did(7);

    let vc = node
        .attestors()
        .issue_credential(
            &issuer,
            &subject,
            ReviewMethod::DocumentReview,
            AssuranceLevel::Standard,
            None,
            Some(Utc::now() + chrono::Duration::days(365)),
        )
        .unwrap();

    node.attestors()
        .revoke_credential(&vc.credential_hash, &foundation, "policy violation")
        .unwrap();
    assert!(!node
        .attestors()
        .is_credential_valid(&vc.credential_hash)
        .unwrap());

    let trail = node.attestors().audit_logs(Some(&foundation), None).unwrap();
    assert_eq!(trail.last().unwrap().action, AuditAction::CredentialRevoked);
}
