use pohw_core::{AttestorStatus, ContentHash, Did};
use pohw_crypto::CryptoError;
use pohw_store::StoreError;

/// Attestor-framework errors.
///
/// An unmet multi-attestor policy is not among them: it is a normal
/// business outcome reported through `PolicyOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum AttestorError {
    #[error("attestor not found: {0}")]
    AttestorNotFound(Did),

    #[error("attestor already registered: {0}")]
    DuplicateAttestor(Did),

    #[error("credential not found: {0}")]
    CredentialNotFound(ContentHash),

    #[error("credential already exists: {0}")]
    DuplicateCredential(ContentHash),

    #[error("credential already revoked: {0}")]
    AlreadyRevoked(ContentHash),

    #[error("invalid attestor state transition from {from} to {to}")]
    InvalidTransition {
        from: AttestorStatus,
        to: AttestorStatus,
    },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("unknown policy: {0}")]
    PolicyNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
