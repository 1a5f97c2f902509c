use thiserror::Error;

/// Error type for signed credential operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("Failed to encode credential: {0}")]
    EncodingFailed(String),

    #[error("Credential is expired")]
    Expired,

    #[error("Credential is invalid: {0}")]
    InvalidToken(String),
}
