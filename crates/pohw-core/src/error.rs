/// Core validation errors shared across registry layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    #[error("configuration error: {0}")]
    Config(String),
}
