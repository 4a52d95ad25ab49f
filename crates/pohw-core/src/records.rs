//! The registry data model.
//!
//! These records are the shapes exchanged between the engines and the
//! persistence collaborator. Sealed values (`MerkleBatch::root`,
//! `ContinuityClaim`, `RevocationRecord`) are never revised after creation;
//! append-only collections (`anchors`, audit log, anomaly log) only grow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AssuranceLevel, AttestorKind, BatchId, ContentHash, Did, TrustTier};

/// A signed attestation of human-authored work.
///
/// `batch_id` and `merkle_index` are set exactly once, by the batch engine,
/// when the proof is sealed into a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRecord {
    /// Content hash of the attested work. Unique key of the record.
    pub hash: ContentHash,
    /// Author's Ed25519 signature over the content hash (hex-encoded).
    pub signature: String,
    /// DID of the author.
    pub author_did: Did,
    /// When the registry accepted the submission.
    pub timestamp: DateTime<Utc>,
    /// Batch the proof was sealed into, if any.
    pub batch_id: Option<BatchId>,
    /// Leaf position within the sealed batch.
    pub merkle_index: Option<u32>,
    /// Declared process metrics accompanying the submission.
    pub process_digest: Option<ProcessDigest>,
    /// Trust tier assigned at submission time.
    pub tier: Option<TrustTier>,
}

/// Summary of the authoring process declared with a submission.
///
/// Consumed by the fraud-mitigation engine; the registry records it but
/// never treats it as proof.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessDigest {
    /// Declared entropy of the authoring session's event stream.
    pub entropy: f64,
    /// Number of recorded editing events.
    pub event_count: u64,
}

/// A sealed, immutable batch of proofs committed under one Merkle root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleBatch {
    pub id: BatchId,
    /// Merkle root over the batch's leaves, hex-encoded.
    pub root: ContentHash,
    /// Number of leaves sealed into the batch.
    pub size: u64,
    pub created_at: DateTime<Utc>,
    /// External anchor receipts, appended asynchronously after sealing.
    pub anchors: Vec<BatchAnchor>,
}

/// Receipt of a batch root anchored on an external chain.
///
/// The registry stores but never validates the chain-specific contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAnchor {
    /// Target chain identifier (e.g. "bitcoin", "ethereum").
    pub chain: String,
    /// Transaction reference on the target chain.
    pub tx: String,
    /// Block height, once confirmed.
    pub block: Option<u64>,
    pub anchored_at: DateTime<Utc>,
}

/// A public key entry in a DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethodEntry {
    /// Method id, e.g. `did:pohw:<id>#keys-1`.
    pub id: String,
    /// Key suite name.
    pub key_type: String,
    /// DID controlling this key.
    pub controller: Did,
    /// Hex-encoded Ed25519 public key.
    pub public_key_hex: String,
}

/// A DID document as stored by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidDocument {
    pub did: Did,
    pub verification_method: Vec<VerificationMethodEntry>,
    /// Predecessor DID when this document is the output of a rotation.
    pub previous_did: Option<Did>,
    /// Continuity claim binding this document to its predecessor.
    /// Immutable once stored.
    pub continuity_claim: Option<ContinuityClaim>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

/// Cryptographic artifact proving a new DID is the legitimate successor of
/// an old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityClaim {
    pub previous_did: Did,
    /// Hex SHA-256 of the predecessor's canonical first verification method.
    pub parent_reference: String,
    /// Optional batch anchor reference cited at rotation time.
    pub last_anchor: Option<String>,
    /// Hex SHA-256 over `old_key_signature || new_key_signature` bytes.
    pub succession_signature: String,
    /// Old key's Ed25519 signature over the canonical rotation payload (hex).
    pub old_key_signature: String,
    /// New key's Ed25519 signature over the canonical rotation payload (hex).
    pub new_key_signature: String,
    pub registry_timestamp: DateTime<Utc>,
}

/// Lifecycle status of a key-continuity-graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KcgNodeStatus {
    Active,
    /// The key was rotated away. Terminal for acting as this identity.
    Rotated,
    /// The identity was revoked. Terminal.
    Revoked,
}

impl fmt::Display for KcgNodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Rotated => write!(f, "rotated"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// One node of the key-continuity graph. One node per DID; `previous_node`
/// forms a singly-linked backward chain that must stay acyclic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KcgNode {
    pub did: Did,
    /// Hex SHA-256 fingerprint of the node's public key.
    pub key_fingerprint: String,
    pub previous_node: Option<Did>,
    pub status: KcgNodeStatus,
    /// Reason recorded when the node was revoked.
    pub status_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-DID reputation state. Mutated on every accepted or rejected
/// submission, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub did: Did,
    /// Score clamped to [0, 100] on every update.
    pub score: f64,
    pub tier: TrustTier,
    pub successful_proofs: u64,
    pub anomalies: u64,
    pub updated_at: DateTime<Utc>,
}

/// Classification of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    RateExceeded,
    EntropyDiscrepancy,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateExceeded => write!(f, "rate_exceeded"),
            Self::EntropyDiscrepancy => write!(f, "entropy_discrepancy"),
        }
    }
}

/// One entry of the append-only anomaly log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub did: Did,
    pub timestamp: DateTime<Utc>,
    pub kind: AnomalyKind,
    /// The exact metrics that produced the decision, for auditability.
    pub details: serde_json::Value,
}

/// Lifecycle status of an accredited attestor.
///
/// Forward transitions only: `pending → active → {suspended, revoked}`.
/// `revoked` is terminal; `suspended` returns to `active` only through the
/// explicit re-approval path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestorStatus {
    Pending,
    Active,
    Suspended,
    Revoked,
}

impl AttestorStatus {
    /// Whether this is a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Only active attestors may issue credentials.
    pub fn can_issue(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for AttestorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Suspended => write!(f, "suspended"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// An accredited third-party verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestorRecord {
    pub did: Did,
    pub name: String,
    pub kind: AttestorKind,
    /// Hex-encoded Ed25519 public key.
    pub public_key_hex: String,
    pub public_key_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub status: AttestorStatus,
    pub next_audit_due: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How an attestor verified the subject's humanity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMethod {
    /// Review of submitted work artifacts and process records.
    DocumentReview,
    /// A live, interactive verification session.
    LiveSession,
    /// Audit of the subject's authoring-process telemetry.
    ProcessAudit,
}

impl fmt::Display for ReviewMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentReview => write!(f, "document_review"),
            Self::LiveSession => write!(f, "live_session"),
            Self::ProcessAudit => write!(f, "process_audit"),
        }
    }
}

/// A human-verification credential issued by an attestor.
///
/// `credential_hash` is the content hash of the canonicalized credential
/// body and is the sole lookup/revocation key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiableCredential {
    pub attestor_did: Did,
    pub subject_did: Did,
    pub verification_method: ReviewMethod,
    pub assurance_level: AssuranceLevel,
    /// Named policy context the credential was issued under.
    pub policy: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub credential_hash: ContentHash,
    pub issued_at: DateTime<Utc>,
}

impl VerifiableCredential {
    /// Whether the credential has passed its expiration date.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.map(|exp| now > exp).unwrap_or(false)
    }
}

/// Append-only record revoking one credential. Once stored, the
/// credential's validity can never flip back to valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub credential_hash: ContentHash,
    /// Attestor that performed the revocation.
    pub attestor_did: Did,
    pub reason: String,
    pub revoked_at: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
}

/// Actions recorded in the attestor-framework audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AttestorRegistered,
    AttestorApproved,
    AttestorSuspended,
    AttestorRevoked,
    CredentialIssued,
    CredentialRevoked,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttestorRegistered => write!(f, "attestor_registered"),
            Self::AttestorApproved => write!(f, "attestor_approved"),
            Self::AttestorSuspended => write!(f, "attestor_suspended"),
            Self::AttestorRevoked => write!(f, "attestor_revoked"),
            Self::CredentialIssued => write!(f, "credential_issued"),
            Self::CredentialRevoked => write!(f, "credential_revoked"),
        }
    }
}

/// One entry of the append-only attestor-framework audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub attestor_did: Option<Did>,
    pub credential_hash: Option<ContentHash>,
    pub details: serde_json::Value,
}
