use pohw_attestor::AttestorError;
use pohw_core::{Did, KcgNodeStatus};
use pohw_crypto::CryptoError;
use pohw_identity::IdentityError;
use pohw_ledger::LedgerError;
use pohw_reputation::ReputationError;

/// Registry-node errors.
///
/// Rate-limit denials and unmet policies never surface here; they are
/// structured results (`RateDecision`, `PolicyOutcome`) on the happy path.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("identity {did} is {status}, only active identities may submit")]
    InactiveIdentity { did: Did, status: KcgNodeStatus },

    #[error("anchoring failed after {attempts} attempts: {last}")]
    AnchorFailed { attempts: u32, last: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Reputation(#[from] ReputationError),

    #[error(transparent)]
    Attestor(#[from] AttestorError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
