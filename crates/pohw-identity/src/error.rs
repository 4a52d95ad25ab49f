use pohw_core::Did;
use pohw_crypto::CryptoError;
use pohw_store::StoreError;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("DID not found: {0}")]
    DidNotFound(Did),

    #[error("DID already registered: {0}")]
    DuplicateDid(Did),

    #[error("DID already rotated: {0}")]
    AlreadyRotated(Did),

    #[error("DID is revoked: {0}")]
    Revoked(Did),

    #[error("supplied key does not control {0}")]
    KeyMismatch(Did),

    #[error("rotation would create a cycle through {0}")]
    CycleDetected(Did),

    #[error("continuity verification failed: {check}")]
    ContinuityVerification {
        /// Which check failed, when derivable. Never a guess at why.
        check: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
