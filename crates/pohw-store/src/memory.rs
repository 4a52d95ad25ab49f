//! In-memory reference backend.
//!
//! DashMap-keyed record families; per-key operations are atomic through the
//! map's entry API. Append-only logs (anomalies, audit) live behind an
//! RwLock'd vector and only ever grow.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::RwLock;

use pohw_core::{
    AnomalyEvent, AttestorRecord, AuditLogEntry, BatchAnchor, BatchId, ContentHash, Did,
    DidDocument, KcgNode, KcgNodeStatus, MerkleBatch, ProofRecord, ReputationRecord,
    RevocationRecord, VerifiableCredential,
};

use crate::error::StoreError;
use crate::traits::{
    AttestorStore, AuditStore, BatchStore, CredentialStore, DidStore, ProofStore, ReputationStore,
};

/// In-memory store implementing every persistence trait.
#[derive(Default)]
pub struct MemoryStore {
    proofs: DashMap<String, ProofRecord>,
    batches: DashMap<String, MerkleBatch>,
    documents: DashMap<String, DidDocument>,
    nodes: DashMap<String, KcgNode>,
    reputations: DashMap<String, ReputationRecord>,
    attestors: DashMap<String, AttestorRecord>,
    credentials: DashMap<String, VerifiableCredential>,
    revocations: DashMap<String, RevocationRecord>,
    anomalies: RwLock<Vec<AnomalyEvent>>,
    audit_log: RwLock<Vec<AuditLogEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn insert_new<V: Clone>(
    map: &DashMap<String, V>,
    key: String,
    value: V,
    what: &str,
) -> Result<(), StoreError> {
    match map.entry(key) {
        dashmap::mapref::entry::Entry::Occupied(e) => {
            Err(StoreError::Conflict(format!("{} {} already exists", what, e.key())))
        }
        dashmap::mapref::entry::Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
    }
}

impl ProofStore for MemoryStore {
    fn store_proof(&self, proof: &ProofRecord) -> Result<(), StoreError> {
        insert_new(
            &self.proofs,
            proof.hash.as_str().to_string(),
            proof.clone(),
            "proof",
        )
    }

    fn get_proof(&self, hash: &ContentHash) -> Result<Option<ProofRecord>, StoreError> {
        Ok(self.proofs.get(hash.as_str()).map(|p| p.clone()))
    }

    fn assign_proof_to_batch(
        &self,
        hash: &ContentHash,
        batch_id: BatchId,
        merkle_index: u32,
    ) -> Result<(), StoreError> {
        let mut proof = self
            .proofs
            .get_mut(hash.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("proof {}", hash)))?;
        if proof.batch_id.is_some() {
            return Err(StoreError::Conflict(format!(
                "proof {} already assigned to a batch",
                hash
            )));
        }
        proof.batch_id = Some(batch_id);
        proof.merkle_index = Some(merkle_index);
        Ok(())
    }

    fn get_proofs_by_batch(&self, batch_id: &BatchId) -> Result<Vec<ProofRecord>, StoreError> {
        let mut proofs: Vec<ProofRecord> = self
            .proofs
            .iter()
            .filter(|entry| entry.value().batch_id.as_ref() == Some(batch_id))
            .map(|entry| entry.value().clone())
            .collect();
        proofs.sort_by_key(|p| p.merkle_index);
        Ok(proofs)
    }
}

impl BatchStore for MemoryStore {
    fn store_batch(&self, batch: &MerkleBatch) -> Result<(), StoreError> {
        insert_new(
            &self.batches,
            batch.id.to_string(),
            batch.clone(),
            "batch",
        )
    }

    fn get_batch(&self, id: &BatchId) -> Result<Option<MerkleBatch>, StoreError> {
        Ok(self.batches.get(&id.to_string()).map(|b| b.clone()))
    }

    fn append_anchor(&self, id: &BatchId, anchor: BatchAnchor) -> Result<(), StoreError> {
        let mut batch = self
            .batches
            .get_mut(&id.to_string())
            .ok_or_else(|| StoreError::NotFound(format!("batch {}", id)))?;
        batch.anchors.push(anchor);
        Ok(())
    }
}

impl DidStore for MemoryStore {
    fn store_document(&self, document: &DidDocument) -> Result<(), StoreError> {
        insert_new(
            &self.documents,
            document.did.uri().to_string(),
            document.clone(),
            "DID document",
        )
    }

    fn get_document(&self, did: &Did) -> Result<Option<DidDocument>, StoreError> {
        Ok(self.documents.get(did.uri()).map(|d| d.clone()))
    }

    fn store_node(&self, node: &KcgNode) -> Result<(), StoreError> {
        insert_new(
            &self.nodes,
            node.did.uri().to_string(),
            node.clone(),
            "continuity node",
        )
    }

    fn get_node(&self, did: &Did) -> Result<Option<KcgNode>, StoreError> {
        Ok(self.nodes.get(did.uri()).map(|n| n.clone()))
    }

    fn set_node_status(
        &self,
        did: &Did,
        status: KcgNodeStatus,
        reason: Option<String>,
    ) -> Result<(), StoreError> {
        let mut node = self
            .nodes
            .get_mut(did.uri())
            .ok_or_else(|| StoreError::NotFound(format!("continuity node {}", did)))?;
        node.status = status;
        if reason.is_some() {
            node.status_reason = reason;
        }
        Ok(())
    }
}

impl ReputationStore for MemoryStore {
    fn store_reputation(&self, record: &ReputationRecord) -> Result<(), StoreError> {
        self.reputations
            .insert(record.did.uri().to_string(), record.clone());
        Ok(())
    }

    fn get_reputation(&self, did: &Did) -> Result<Option<ReputationRecord>, StoreError> {
        Ok(self.reputations.get(did.uri()).map(|r| r.clone()))
    }

    fn append_anomaly(&self, event: &AnomalyEvent) -> Result<(), StoreError> {
        self.anomalies
            .write()
            .map_err(|_| StoreError::Backend("anomaly log lock poisoned".into()))?
            .push(event.clone());
        Ok(())
    }

    fn anomalies_since(
        &self,
        did: &Did,
        since: DateTime<Utc>,
    ) -> Result<Vec<AnomalyEvent>, StoreError> {
        let log = self
            .anomalies
            .read()
            .map_err(|_| StoreError::Backend("anomaly log lock poisoned".into()))?;
        Ok(log
            .iter()
            .filter(|e| e.did == *did && e.timestamp >= since)
            .cloned()
            .collect())
    }
}

impl AttestorStore for MemoryStore {
    fn store_attestor(&self, record: &AttestorRecord) -> Result<(), StoreError> {
        insert_new(
            &self.attestors,
            record.did.uri().to_string(),
            record.clone(),
            "attestor",
        )
    }

    fn get_attestor(&self, did: &Did) -> Result<Option<AttestorRecord>, StoreError> {
        Ok(self.attestors.get(did.uri()).map(|a| a.clone()))
    }

    fn update_attestor(&self, record: &AttestorRecord) -> Result<(), StoreError> {
        let mut existing = self
            .attestors
            .get_mut(record.did.uri())
            .ok_or_else(|| StoreError::NotFound(format!("attestor {}", record.did)))?;
        *existing = record.clone();
        Ok(())
    }
}

impl CredentialStore for MemoryStore {
    fn store_credential(&self, credential: &VerifiableCredential) -> Result<(), StoreError> {
        insert_new(
            &self.credentials,
            credential.credential_hash.as_str().to_string(),
            credential.clone(),
            "credential",
        )
    }

    fn get_credential(
        &self,
        hash: &ContentHash,
    ) -> Result<Option<VerifiableCredential>, StoreError> {
        Ok(self.credentials.get(hash.as_str()).map(|c| c.clone()))
    }

    fn store_revocation(&self, revocation: &RevocationRecord) -> Result<(), StoreError> {
        insert_new(
            &self.revocations,
            revocation.credential_hash.as_str().to_string(),
            revocation.clone(),
            "revocation for credential",
        )
    }

    fn get_revocation(&self, hash: &ContentHash) -> Result<Option<RevocationRecord>, StoreError> {
        Ok(self.revocations.get(hash.as_str()).map(|r| r.clone()))
    }
}

impl AuditStore for MemoryStore {
    fn append_audit(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        self.audit_log
            .write()
            .map_err(|_| StoreError::Backend("audit log lock poisoned".into()))?
            .push(entry.clone());
        Ok(())
    }

    fn audit_entries(
        &self,
        attestor_did: Option<&Did>,
        limit: Option<usize>,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        let log = self
            .audit_log
            .read()
            .map_err(|_| StoreError::Backend("audit log lock poisoned".into()))?;
        let mut entries: Vec<AuditLogEntry> = log
            .iter()
            .filter(|e| match attestor_did {
                Some(did) => e.attestor_did.as_ref() == Some(did),
                None => true,
            })
            .cloned()
            .collect();
        if let Some(limit) = limit {
            let skip = entries.len().saturating_sub(limit);
            entries.drain(..skip);
        }
        Ok(entries)
    }
}
