//! The batch engine: pending queue, sealing, and proof generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use pohw_core::{BatchAnchor, BatchConfig, BatchId, ContentHash, MerkleBatch, ProofRecord};
use pohw_crypto::Hash;
use pohw_store::{BatchStore, ProofStore, StoreError};

use crate::error::LedgerError;
use crate::merkle::{build_root, inclusion_steps, MerkleStep};

/// Persistence surface the batch engine needs.
pub trait LedgerStore: ProofStore + BatchStore {}

impl<T: ProofStore + BatchStore> LedgerStore for T {}

/// An inclusion proof for one sealed leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InclusionProof {
    pub batch_id: BatchId,
    pub merkle_index: u32,
    /// Sibling hashes bottom to top.
    pub steps: Vec<MerkleStep>,
    /// The sealed batch root, hex-encoded.
    pub root: ContentHash,
}

/// Read-only view of a sealed batch handed to the anchoring collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorView {
    pub id: BatchId,
    pub root: ContentHash,
    pub created_at: DateTime<Utc>,
}

/// Groups pending proofs into periodically sealed, verifiable batches.
///
/// The pending queue preserves arrival order; sealing snapshots and clears
/// it inside a single critical section, so a submission racing a seal lands
/// either in the sealed batch or in the next queue, never both or neither.
pub struct BatchEngine {
    store: Arc<dyn LedgerStore>,
    config: BatchConfig,
    pending: Mutex<Vec<ContentHash>>,
    /// Start of the current inter-batch interval.
    interval_start: Mutex<DateTime<Utc>>,
}

impl BatchEngine {
    /// Create an engine over the given store.
    pub fn new(store: Arc<dyn LedgerStore>, config: BatchConfig) -> Self {
        Self {
            store,
            config,
            pending: Mutex::new(Vec::new()),
            interval_start: Mutex::new(Utc::now()),
        }
    }

    /// Accept a validated proof into the registry and the pending queue.
    pub fn submit(&self, proof: ProofRecord) -> Result<(), LedgerError> {
        if proof.batch_id.is_some() || proof.merkle_index.is_some() {
            return Err(LedgerError::Validation(
                "submitted proof must not carry a batch assignment".into(),
            ));
        }
        let hash = proof.hash.clone();
        match self.store.store_proof(&proof) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(LedgerError::DuplicateProof(hash)),
            Err(e) => return Err(e.into()),
        }
        self.pending.lock().expect("pending queue poisoned").push(hash);
        Ok(())
    }

    /// Number of proofs awaiting the next seal.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("pending queue poisoned").len()
    }

    /// Whether a seal is due: the queue crossed the size threshold, or the
    /// inter-batch interval elapsed with a non-empty queue.
    pub fn should_create_batch(&self) -> bool {
        let len = self.pending_len();
        if len == 0 {
            return false;
        }
        if len >= self.config.threshold {
            return true;
        }
        let started = *self.interval_start.lock().expect("interval poisoned");
        let elapsed = Utc::now().signed_duration_since(started);
        elapsed.num_seconds() >= self.config.interval_secs as i64
    }

    /// Seal the pending queue into a new batch.
    ///
    /// Returns `None` if the queue was empty at the atomic snapshot. The
    /// sealed batch's root and size are immutable afterwards; each sealed
    /// proof receives its batch id and merkle index exactly once.
    pub fn create_batch(&self) -> Result<Option<MerkleBatch>, LedgerError> {
        let snapshot: Vec<ContentHash> = {
            let mut queue = self.pending.lock().expect("pending queue poisoned");
            if queue.is_empty() {
                return Ok(None);
            }
            std::mem::take(&mut *queue)
        };

        let leaves = Self::decode_leaves(&snapshot)?;
        let root_hex = hex::encode(build_root(&leaves));
        let batch = MerkleBatch {
            id: BatchId::generate(),
            root: ContentHash::new(root_hex).expect("sha256 hex is a valid content hash"),
            size: snapshot.len() as u64,
            created_at: Utc::now(),
            anchors: Vec::new(),
        };

        if let Err(e) = self.store.store_batch(&batch) {
            // The seal never happened; give the snapshot back to the queue
            // ahead of anything that arrived meanwhile.
            let mut queue = self.pending.lock().expect("pending queue poisoned");
            let arrived = std::mem::take(&mut *queue);
            *queue = snapshot;
            queue.extend(arrived);
            return Err(e.into());
        }

        for (index, hash) in snapshot.iter().enumerate() {
            self.store
                .assign_proof_to_batch(hash, batch.id, index as u32)?;
        }

        *self.interval_start.lock().expect("interval poisoned") = Utc::now();

        tracing::info!(
            batch_id = %batch.id,
            size = batch.size,
            root = %batch.root,
            "batch sealed"
        );
        Ok(Some(batch))
    }

    /// Generate an inclusion proof for a sealed proof hash.
    ///
    /// The tree is recomputed from the batch's stored leaf set on demand;
    /// no tree structure is cached between calls. Returns `None` while the
    /// proof's batch is not yet sealed.
    pub fn merkle_proof(&self, hash: &ContentHash) -> Result<Option<InclusionProof>, LedgerError> {
        let proof = self
            .store
            .get_proof(hash)?
            .ok_or_else(|| LedgerError::ProofNotFound(hash.clone()))?;
        let (Some(batch_id), Some(merkle_index)) = (proof.batch_id, proof.merkle_index) else {
            return Ok(None);
        };
        let batch = self
            .store
            .get_batch(&batch_id)?
            .ok_or(LedgerError::BatchNotFound(batch_id))?;

        let sealed = self.store.get_proofs_by_batch(&batch_id)?;
        let hashes: Vec<ContentHash> = sealed.into_iter().map(|p| p.hash).collect();
        let leaves = Self::decode_leaves(&hashes)?;

        let steps = inclusion_steps(&leaves, merkle_index as usize).ok_or_else(|| {
            LedgerError::Validation(format!(
                "merkle index {} out of range for batch of {} leaves",
                merkle_index,
                leaves.len()
            ))
        })?;

        Ok(Some(InclusionProof {
            batch_id,
            merkle_index,
            steps,
            root: batch.root,
        }))
    }

    /// Look up a sealed batch.
    pub fn get_batch(&self, id: &BatchId) -> Result<MerkleBatch, LedgerError> {
        self.store
            .get_batch(id)?
            .ok_or(LedgerError::BatchNotFound(*id))
    }

    /// Read-only view for the anchoring collaborator.
    pub fn anchor_view(&self, id: &BatchId) -> Result<AnchorView, LedgerError> {
        let batch = self.get_batch(id)?;
        Ok(AnchorView {
            id: batch.id,
            root: batch.root,
            created_at: batch.created_at,
        })
    }

    /// Write-back hook for the anchoring collaborator. The receipt's
    /// contents are stored, never validated here.
    pub fn append_anchor(&self, id: &BatchId, anchor: BatchAnchor) -> Result<(), LedgerError> {
        match self.store.append_anchor(id, anchor) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(_)) => Err(LedgerError::BatchNotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    fn decode_leaves(hashes: &[ContentHash]) -> Result<Vec<Hash>, LedgerError> {
        hashes
            .iter()
            .map(|h| {
                h.to_bytes()
                    .map_err(|e| LedgerError::Validation(e.to_string()))
            })
            .collect()
    }
}
