use pohw_store::StoreError;

/// Reputation-engine errors.
///
/// A failed rate limit is not among them: it is a normal business outcome
/// reported through `RateDecision`, never an error.
#[derive(Debug, thiserror::Error)]
pub enum ReputationError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
