//! PoHW Core
//!
//! Shared foundation for the PoHW registry node:
//! - Identifier newtypes (DIDs, content hashes, batch ids)
//! - The registry data model (proofs, batches, DID documents, attestors,
//!   credentials, reputation, audit entries)
//! - Core error kinds
//! - Tunable registry configuration loaded from TOML

pub mod config;
pub mod error;
pub mod records;
pub mod types;

pub use config::{
    BatchConfig, FraudConfig, PolicyConfig, PolicyRule, RegistryConfig, ReputationConfig,
};
pub use error::CoreError;
pub use records::{
    AnomalyEvent, AnomalyKind, AttestorRecord, AttestorStatus, AuditAction, AuditLogEntry,
    BatchAnchor, ContinuityClaim, DidDocument, KcgNode, KcgNodeStatus, MerkleBatch, ProcessDigest,
    ProofRecord, ReputationRecord, ReviewMethod, RevocationRecord, VerifiableCredential,
    VerificationMethodEntry,
};
pub use types::{AssuranceLevel, AttestorKind, BatchId, ContentHash, Did, TrustTier};
