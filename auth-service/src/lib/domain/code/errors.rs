use thiserror::Error;

/// Error for code repository operations.
#[derive(Debug, Clone, Error)]
pub enum CodeRepositoryError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Top-level error for confirmation code operations.
///
/// `NotFound`, `Expired`, and `AlreadyUsed` are distinct kinds because
/// they drive different user-facing next actions: expired asks for a new
/// code, already-used is a possible replay and is logged for review.
#[derive(Debug, Error)]
pub enum CodeError {
    #[error("Invalid code configuration: {0}")]
    Configuration(String),

    #[error("Code does not exist")]
    NotFound,

    #[error("Code is expired")]
    Expired,

    #[error("Code is already used")]
    AlreadyUsed,

    #[error("Code repository error: {0}")]
    Repository(#[from] CodeRepositoryError),
}
