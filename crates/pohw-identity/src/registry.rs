//! DID registration, rotation, and revocation.

use chrono::Utc;
use std::sync::{Arc, Mutex};

use pohw_core::{
    ContinuityClaim, Did, DidDocument, KcgNode, KcgNodeStatus, VerificationMethodEntry,
};
use pohw_crypto::{hash, sign, KeyPair, PublicKey};
use pohw_store::DidStore;

use crate::continuity::{parent_reference, succession_digest, RotationOutcome, RotationPayload};
use crate::error::IdentityError;
use crate::graph;

/// Derive a DID from a public key: `did:pohw:` plus the first 32 hex
/// characters of the key's SHA-256. A content identifier, not a random
/// string — the same key always derives the same DID.
pub fn derive_did(public_key: &PublicKey) -> Did {
    let digest = hex::encode(hash(&public_key.to_bytes()));
    Did::from_identifier(&digest[..32])
}

const KEY_TYPE: &str = "Ed25519VerificationKey2020";

/// Manages DID documents and the key-continuity graph over an injected
/// store. Rotations are serialized through a single lock so the
/// acyclicity check and the node writes happen in one critical section.
pub struct IdentityRegistry {
    store: Arc<dyn DidStore>,
    rotation_lock: Mutex<()>,
}

impl IdentityRegistry {
    /// Create a registry over the given store.
    pub fn new(store: Arc<dyn DidStore>) -> Self {
        Self {
            store,
            rotation_lock: Mutex::new(()),
        }
    }

    /// Register a new identity from its public key.
    pub fn register(&self, public_key: &PublicKey) -> Result<DidDocument, IdentityError> {
        let did = derive_did(public_key);
        if self.store.get_document(&did)?.is_some() {
            return Err(IdentityError::DuplicateDid(did));
        }

        let now = Utc::now();
        let document = DidDocument {
            did: did.clone(),
            verification_method: vec![verification_method(&did, public_key)],
            previous_did: None,
            continuity_claim: None,
            created: now,
            updated: None,
        };
        let node = KcgNode {
            did: did.clone(),
            key_fingerprint: hex::encode(hash(&public_key.to_bytes())),
            previous_node: None,
            status: KcgNodeStatus::Active,
            status_reason: None,
            created_at: now,
        };
        self.store.store_document(&document)?;
        self.store.store_node(&node)?;
        tracing::info!(did = %did, "DID registered");
        Ok(document)
    }

    /// Resolve a DID to its document.
    pub fn resolve(&self, did: &Did) -> Result<DidDocument, IdentityError> {
        self.store
            .get_document(did)?
            .ok_or_else(|| IdentityError::DidNotFound(did.clone()))
    }

    /// Look up a continuity-graph node.
    pub fn node(&self, did: &Did) -> Result<KcgNode, IdentityError> {
        self.store
            .get_node(did)?
            .ok_or_else(|| IdentityError::DidNotFound(did.clone()))
    }

    /// Rotate an identity to a new signing key.
    ///
    /// Produces the successor document and a continuity claim carrying both
    /// key signatures over the canonical rotation payload plus the
    /// succession digest. The old node becomes `rotated` (retained, never
    /// deleted); the acyclicity invariant is enforced before any write, in
    /// the same critical section.
    pub fn rotate(
        &self,
        old_did: &Did,
        old_keypair: &KeyPair,
        new_keypair: &KeyPair,
        last_anchor: Option<String>,
    ) -> Result<RotationOutcome, IdentityError> {
        let _guard = self.rotation_lock.lock().expect("rotation lock poisoned");

        let old_document = self.resolve(old_did)?;
        let old_node = self.node(old_did)?;
        match old_node.status {
            KcgNodeStatus::Active => {}
            KcgNodeStatus::Rotated => return Err(IdentityError::AlreadyRotated(old_did.clone())),
            KcgNodeStatus::Revoked => return Err(IdentityError::Revoked(old_did.clone())),
        }

        let old_method = old_document
            .verification_method
            .first()
            .ok_or_else(|| IdentityError::Validation("document has no verification method".into()))?;
        if old_method.public_key_hex != old_keypair.public_key().to_hex() {
            return Err(IdentityError::KeyMismatch(old_did.clone()));
        }

        let new_public = new_keypair.public_key();
        let new_did = derive_did(&new_public);
        if new_did == *old_did {
            return Err(IdentityError::Validation(
                "rotation must introduce a different key".into(),
            ));
        }
        if self.store.get_document(&new_did)?.is_some() {
            // The key was used before: either an unrelated registration or
            // an ancestor of this very chain, which would close a cycle.
            if graph::is_ancestor(self.store.as_ref(), old_did, &new_did)? {
                return Err(IdentityError::CycleDetected(new_did));
            }
            return Err(IdentityError::DuplicateDid(new_did));
        }

        let payload = RotationPayload {
            previous_did: old_did.clone(),
            parent_reference: parent_reference(old_method)?,
            last_anchor,
            new_did: new_did.clone(),
            timestamp: Utc::now(),
        };
        let bytes = payload.signing_bytes()?;
        let old_sig = sign(&bytes, old_keypair);
        let new_sig = sign(&bytes, new_keypair);

        let claim = ContinuityClaim {
            previous_did: payload.previous_did.clone(),
            parent_reference: payload.parent_reference.clone(),
            last_anchor: payload.last_anchor.clone(),
            succession_signature: succession_digest(&old_sig, &new_sig),
            old_key_signature: old_sig.to_hex(),
            new_key_signature: new_sig.to_hex(),
            registry_timestamp: payload.timestamp,
        };

        let document = DidDocument {
            did: new_did.clone(),
            verification_method: vec![verification_method(&new_did, &new_public)],
            previous_did: Some(old_did.clone()),
            continuity_claim: Some(claim.clone()),
            created: payload.timestamp,
            updated: None,
        };
        let node = KcgNode {
            did: new_did.clone(),
            key_fingerprint: hex::encode(hash(&new_public.to_bytes())),
            previous_node: Some(old_did.clone()),
            status: KcgNodeStatus::Active,
            status_reason: None,
            created_at: payload.timestamp,
        };

        self.store.store_document(&document)?;
        self.store.store_node(&node)?;
        self.store
            .set_node_status(old_did, KcgNodeStatus::Rotated, None)?;

        tracing::info!(old = %old_did, new = %new_did, "DID rotated");
        Ok(RotationOutcome {
            new_did,
            document,
            claim,
        })
    }

    /// Revoke an identity. Forward-only and terminal: the DID can no
    /// longer rotate, but its history is retained. Revoking an already
    /// revoked DID is a no-op.
    pub fn revoke(&self, did: &Did, reason: Option<String>) -> Result<(), IdentityError> {
        let _guard = self.rotation_lock.lock().expect("rotation lock poisoned");
        let node = self.node(did)?;
        if node.status == KcgNodeStatus::Revoked {
            return Ok(());
        }
        self.store
            .set_node_status(did, KcgNodeStatus::Revoked, reason.clone())?;
        tracing::warn!(did = %did, reason = reason.as_deref().unwrap_or(""), "DID revoked");
        Ok(())
    }

    /// The identity's continuity chain, oldest-first.
    pub fn continuity_chain(&self, did: &Did) -> Result<Vec<KcgNode>, IdentityError> {
        graph::continuity_chain(self.store.as_ref(), did)
    }
}

fn verification_method(did: &Did, public_key: &PublicKey) -> VerificationMethodEntry {
    VerificationMethodEntry {
        id: format!("{}#keys-1", did),
        key_type: KEY_TYPE.to_string(),
        controller: did.clone(),
        public_key_hex: public_key.to_hex(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuity::verify_claim;
    use pohw_store::MemoryStore;

    fn registry() -> IdentityRegistry {
        IdentityRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_derive_did_deterministic() {
        let kp = KeyPair::from_seed(&[3u8; 32]);
        let a = derive_did(&kp.public_key());
        let b = derive_did(&kp.public_key());
        assert_eq!(a, b);
        assert_eq!(a.identifier().unwrap().len(), 32);
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = registry();
        let kp = KeyPair::generate();
        let doc = registry.register(&kp.public_key()).unwrap();
        let resolved = registry.resolve(&doc.did).unwrap();
        assert_eq!(resolved.verification_method[0].public_key_hex, kp.public_key().to_hex());
        assert!(resolved.previous_did.is_none());
    }

    #[test]
    fn test_duplicate_registration_conflicts() {
        let registry = registry();
        let kp = KeyPair::generate();
        registry.register(&kp.public_key()).unwrap();
        assert!(matches!(
            registry.register(&kp.public_key()),
            Err(IdentityError::DuplicateDid(_))
        ));
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = registry();
        let did = Did::from_identifier(&"00".repeat(16));
        assert!(matches!(
            registry.resolve(&did),
            Err(IdentityError::DidNotFound(_))
        ));
    }

    #[test]
    fn test_rotate_produces_verifiable_claim() {
        let registry = registry();
        let old_kp = KeyPair::generate();
        let new_kp = KeyPair::generate();
        let doc = registry.register(&old_kp.public_key()).unwrap();

        let outcome = registry
            .rotate(&doc.did, &old_kp, &new_kp, Some("anchor-ref".into()))
            .unwrap();
        assert_eq!(outcome.document.previous_did, Some(doc.did.clone()));
        verify_claim(
            &outcome.claim,
            &old_kp.public_key(),
            &new_kp.public_key(),
            &outcome.new_did,
        )
        .unwrap();
        assert_eq!(outcome.claim.last_anchor.as_deref(), Some("anchor-ref"));

        // Old node flips to rotated, new node is active.
        assert_eq!(registry.node(&doc.did).unwrap().status, KcgNodeStatus::Rotated);
        assert_eq!(
            registry.node(&outcome.new_did).unwrap().status,
            KcgNodeStatus::Active
        );
    }

    #[test]
    fn test_chain_oldest_first() {
        let registry = registry();
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        let kp3 = KeyPair::generate();
        let d1 = registry.register(&kp1.public_key()).unwrap().did;
        let d2 = registry.rotate(&d1, &kp1, &kp2, None).unwrap().new_did;
        let d3 = registry.rotate(&d2, &kp2, &kp3, None).unwrap().new_did;

        let chain = registry.continuity_chain(&d3).unwrap();
        let dids: Vec<&Did> = chain.iter().map(|n| &n.did).collect();
        assert_eq!(dids, vec![&d1, &d2, &d3]);

        // No DID appears twice anywhere in the chain.
        let mut uris: Vec<&str> = chain.iter().map(|n| n.did.uri()).collect();
        uris.sort();
        uris.dedup();
        assert_eq!(uris.len(), chain.len());
    }

    #[test]
    fn test_rotate_twice_from_same_did_rejected() {
        let registry = registry();
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        let kp3 = KeyPair::generate();
        let d1 = registry.register(&kp1.public_key()).unwrap().did;
        registry.rotate(&d1, &kp1, &kp2, None).unwrap();
        assert!(matches!(
            registry.rotate(&d1, &kp1, &kp3, None),
            Err(IdentityError::AlreadyRotated(_))
        ));
    }

    #[test]
    fn test_rotate_back_to_ancestor_key_rejected() {
        let registry = registry();
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        let d1 = registry.register(&kp1.public_key()).unwrap().did;
        let d2 = registry.rotate(&d1, &kp1, &kp2, None).unwrap().new_did;
        // Rotating d2 back onto kp1's DID would close a cycle.
        assert!(matches!(
            registry.rotate(&d2, &kp2, &kp1, None),
            Err(IdentityError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_rotate_with_wrong_key_rejected() {
        let registry = registry();
        let kp = KeyPair::generate();
        let stranger = KeyPair::generate();
        let d1 = registry.register(&kp.public_key()).unwrap().did;
        assert!(matches!(
            registry.rotate(&d1, &stranger, &KeyPair::generate(), None),
            Err(IdentityError::KeyMismatch(_))
        ));
    }

    #[test]
    fn test_rotate_to_same_key_rejected() {
        let registry = registry();
        let kp = KeyPair::generate();
        let d1 = registry.register(&kp.public_key()).unwrap().did;
        assert!(matches!(
            registry.rotate(&d1, &kp, &kp, None),
            Err(IdentityError::Validation(_))
        ));
    }

    #[test]
    fn test_revoked_did_cannot_rotate() {
        let registry = registry();
        let kp = KeyPair::generate();
        let d1 = registry.register(&kp.public_key()).unwrap().did;
        registry.revoke(&d1, Some("key compromise".into())).unwrap();
        assert!(matches!(
            registry.rotate(&d1, &kp, &KeyPair::generate(), None),
            Err(IdentityError::Revoked(_))
        ));
        // History survives revocation.
        assert_eq!(registry.continuity_chain(&d1).unwrap().len(), 1);
    }

    #[test]
    fn test_revoke_idempotent() {
        let registry = registry();
        let kp = KeyPair::generate();
        let d1 = registry.register(&kp.public_key()).unwrap().did;
        registry.revoke(&d1, Some("lost".into())).unwrap();
        registry.revoke(&d1, None).unwrap();
        let node = registry.node(&d1).unwrap();
        assert_eq!(node.status, KcgNodeStatus::Revoked);
        assert_eq!(node.status_reason.as_deref(), Some("lost"));
    }
}
