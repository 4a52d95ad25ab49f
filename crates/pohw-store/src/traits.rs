use chrono::{DateTime, Utc};

use pohw_core::{
    AnomalyEvent, AttestorRecord, AuditLogEntry, BatchAnchor, BatchId, ContentHash, Did,
    DidDocument, KcgNode, KcgNodeStatus, MerkleBatch, ProofRecord, ReputationRecord,
    RevocationRecord, VerifiableCredential,
};

use crate::error::StoreError;

/// Storage for proof records, keyed by content hash.
pub trait ProofStore: Send + Sync {
    /// Store a new proof. Fails with `Conflict` if the hash already exists.
    fn store_proof(&self, proof: &ProofRecord) -> Result<(), StoreError>;

    /// Look up a proof by its content hash.
    fn get_proof(&self, hash: &ContentHash) -> Result<Option<ProofRecord>, StoreError>;

    /// Record a proof's batch membership. Set exactly once; fails with
    /// `Conflict` if the proof is already assigned.
    fn assign_proof_to_batch(
        &self,
        hash: &ContentHash,
        batch_id: BatchId,
        merkle_index: u32,
    ) -> Result<(), StoreError>;

    /// All proofs sealed into a batch, ordered by merkle index.
    fn get_proofs_by_batch(&self, batch_id: &BatchId) -> Result<Vec<ProofRecord>, StoreError>;
}

/// Storage for sealed batches, keyed by batch id.
pub trait BatchStore: Send + Sync {
    /// Store a sealed batch. Fails with `Conflict` if the id already exists.
    fn store_batch(&self, batch: &MerkleBatch) -> Result<(), StoreError>;

    /// Look up a batch by id.
    fn get_batch(&self, id: &BatchId) -> Result<Option<MerkleBatch>, StoreError>;

    /// Append an anchor receipt to a batch's append-only anchor list.
    fn append_anchor(&self, id: &BatchId, anchor: BatchAnchor) -> Result<(), StoreError>;
}

/// Storage for DID documents and key-continuity-graph nodes.
pub trait DidStore: Send + Sync {
    /// Store a DID document. Fails with `Conflict` if the DID exists.
    fn store_document(&self, document: &DidDocument) -> Result<(), StoreError>;

    /// Look up a DID document.
    fn get_document(&self, did: &Did) -> Result<Option<DidDocument>, StoreError>;

    /// Store a continuity-graph node. Fails with `Conflict` if present.
    fn store_node(&self, node: &KcgNode) -> Result<(), StoreError>;

    /// Look up a continuity-graph node.
    fn get_node(&self, did: &Did) -> Result<Option<KcgNode>, StoreError>;

    /// Flip a node's lifecycle status. Fails with `NotFound` if absent.
    fn set_node_status(
        &self,
        did: &Did,
        status: KcgNodeStatus,
        reason: Option<String>,
    ) -> Result<(), StoreError>;
}

/// Storage for reputation records and the anomaly log.
pub trait ReputationStore: Send + Sync {
    /// Upsert a reputation record.
    fn store_reputation(&self, record: &ReputationRecord) -> Result<(), StoreError>;

    /// Look up a reputation record.
    fn get_reputation(&self, did: &Did) -> Result<Option<ReputationRecord>, StoreError>;

    /// Append to the anomaly log.
    fn append_anomaly(&self, event: &AnomalyEvent) -> Result<(), StoreError>;

    /// Anomaly events for a DID at or after the given instant.
    fn anomalies_since(
        &self,
        did: &Did,
        since: DateTime<Utc>,
    ) -> Result<Vec<AnomalyEvent>, StoreError>;
}

/// Storage for attestor records.
pub trait AttestorStore: Send + Sync {
    /// Store a new attestor. Fails with `Conflict` if the DID exists.
    fn store_attestor(&self, record: &AttestorRecord) -> Result<(), StoreError>;

    /// Look up an attestor.
    fn get_attestor(&self, did: &Did) -> Result<Option<AttestorRecord>, StoreError>;

    /// Replace an existing attestor record. Fails with `NotFound` if absent.
    fn update_attestor(&self, record: &AttestorRecord) -> Result<(), StoreError>;
}

/// Storage for credentials and their append-only revocation table.
pub trait CredentialStore: Send + Sync {
    /// Store a credential. Fails with `Conflict` if the hash exists.
    fn store_credential(&self, credential: &VerifiableCredential) -> Result<(), StoreError>;

    /// Look up a credential by content hash.
    fn get_credential(
        &self,
        hash: &ContentHash,
    ) -> Result<Option<VerifiableCredential>, StoreError>;

    /// Append a revocation record. Fails with `Conflict` if the credential
    /// already has one; revocation is monotonic.
    fn store_revocation(&self, revocation: &RevocationRecord) -> Result<(), StoreError>;

    /// Look up the revocation record for a credential, if any.
    fn get_revocation(&self, hash: &ContentHash) -> Result<Option<RevocationRecord>, StoreError>;
}

/// Append-only audit log for the attestor framework.
pub trait AuditStore: Send + Sync {
    /// Append an audit entry.
    fn append_audit(&self, entry: &AuditLogEntry) -> Result<(), StoreError>;

    /// Query audit entries, optionally filtered by attestor, newest last.
    fn audit_entries(
        &self,
        attestor_did: Option<&Did>,
        limit: Option<usize>,
    ) -> Result<Vec<AuditLogEntry>, StoreError>;
}
