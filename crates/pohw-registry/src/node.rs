//! The registry node: one process wiring the four engines over a shared
//! store.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use pohw_attestor::AttestorFramework;
use pohw_core::{
    ContentHash, Did, KcgNodeStatus, ProcessDigest, ProofRecord, RegistryConfig, TrustTier,
};
use pohw_crypto::{verify, PublicKey, Signature};
use pohw_identity::IdentityRegistry;
use pohw_ledger::BatchEngine;
use pohw_reputation::{FraudEngine, RateDecision};
use pohw_store::MemoryStore;

use crate::error::RegistryError;

/// Result of one proof submission.
///
/// A denied submission is still a successful call: the proof is not
/// enqueued, the anomaly is on record, and the decision explains why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub hash: ContentHash,
    pub accepted: bool,
    pub decision: RateDecision,
    /// Author's reputation tier after this submission was folded in.
    pub tier: TrustTier,
}

/// A full registry node over a shared in-memory store.
pub struct RegistryNode {
    config: RegistryConfig,
    identity: IdentityRegistry,
    ledger: Arc<BatchEngine>,
    fraud: FraudEngine,
    attestors: AttestorFramework,
}

impl RegistryNode {
    /// Build a node with a fresh store.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    /// Build a node over an existing store.
    pub fn with_store(store: Arc<MemoryStore>, config: RegistryConfig) -> Self {
        let identity = IdentityRegistry::new(store.clone());
        let ledger = Arc::new(BatchEngine::new(store.clone(), config.batch.clone()));
        let fraud = FraudEngine::new(
            store.clone(),
            config.fraud.clone(),
            config.reputation.clone(),
        );
        let attestors = AttestorFramework::new(store, config.policy.clone());
        Self {
            config,
            identity,
            ledger,
            fraud,
            attestors,
        }
    }

    /// Accept a signed proof of human-authored work.
    ///
    /// Pipeline: resolve the author to an active identity, verify the
    /// signature over the content hash, run the fraud checks, fold the
    /// outcome into the author's reputation, and enqueue the proof only if
    /// it passed. Denials are recorded, not raised.
    pub fn submit_proof(
        &self,
        author_did: &Did,
        hash: ContentHash,
        signature_hex: &str,
        process_digest: Option<ProcessDigest>,
    ) -> Result<SubmissionOutcome, RegistryError> {
        let document = self.identity.resolve(author_did)?;
        let node = self.identity.node(author_did)?;
        if node.status != KcgNodeStatus::Active {
            return Err(RegistryError::InactiveIdentity {
                did: author_did.clone(),
                status: node.status,
            });
        }

        let method = document.verification_method.first().ok_or_else(|| {
            RegistryError::Validation("document has no verification method".into())
        })?;
        let public_key = PublicKey::from_hex(&method.public_key_hex)?;
        let signature = Signature::from_hex(signature_hex)?;
        let leaf = hash
            .to_bytes()
            .map_err(|e| RegistryError::Validation(e.to_string()))?;
        verify(&leaf, &signature, &public_key)?;

        let timestamp = Utc::now();
        let decision = self
            .fraud
            .check_rate_limit(author_did, timestamp, process_digest.as_ref());
        let reputation =
            self.fraud
                .record_submission(author_did, &hash, timestamp, process_digest.as_ref(), &decision)?;

        if decision.allowed {
            self.ledger.submit(ProofRecord {
                hash: hash.clone(),
                signature: signature_hex.to_string(),
                author_did: author_did.clone(),
                timestamp,
                batch_id: None,
                merkle_index: None,
                process_digest,
                tier: Some(reputation.tier),
            })?;
        } else {
            tracing::warn!(
                did = %author_did,
                hash = %hash,
                reason = decision.reason.as_deref().unwrap_or(""),
                "submission denied"
            );
        }

        Ok(SubmissionOutcome {
            hash,
            accepted: decision.allowed,
            decision,
            tier: reputation.tier,
        })
    }

    /// The author's effective trust tier, combining reputation with
    /// credential corroboration.
    ///
    /// Starts from the reputation tier (grey with no history), lifts to
    /// green when the green multi-attestor policy holds over the offered
    /// credentials, and caps at purple while the DID has anomalies inside
    /// the trailing 24 hours.
    pub fn effective_tier(
        &self,
        did: &Did,
        credential_hashes: &[ContentHash],
    ) -> Result<TrustTier, RegistryError> {
        let mut tier = self
            .fraud
            .get_reputation(did)?
            .map(|r| r.tier)
            .unwrap_or(TrustTier::Grey);

        if !credential_hashes.is_empty() {
            let outcome =
                self.attestors
                    .verify_multi_attestor_policy(did, "green", credential_hashes)?;
            if outcome.valid {
                tier = tier.max(TrustTier::Green);
            }
        }

        if self.fraud.has_recent_anomalies(did, 24)? {
            tier = tier.min(TrustTier::Purple);
        }
        Ok(tier)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn identity(&self) -> &IdentityRegistry {
        &self.identity
    }

    pub fn ledger(&self) -> &Arc<BatchEngine> {
        &self.ledger
    }

    pub fn fraud(&self) -> &FraudEngine {
        &self.fraud
    }

    pub fn attestors(&self) -> &AttestorFramework {
        &self.attestors
    }
}
