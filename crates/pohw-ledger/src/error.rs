use pohw_core::{BatchId, ContentHash};
use pohw_store::StoreError;

/// Batch-engine errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("duplicate proof hash: {0}")]
    DuplicateProof(ContentHash),

    #[error("proof not found: {0}")]
    ProofNotFound(ContentHash),

    #[error("batch not found: {0}")]
    BatchNotFound(BatchId),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
