use std::time::Duration;

use thiserror::Error;

/// Error for session cache store operations.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Top-level error for token lifecycle operations.
///
/// Client-facing variants (`InvalidSignature`, `InvalidRefresh`, `Expired`,
/// `Untracked`, `RefreshMismatch`) and infrastructure variants
/// (`CacheRead`, `CacheWrite`) are distinct so callers can apply different
/// retry policy per tier. `Untracked` is surfaced to users with the same
/// message as `Expired` to avoid leaking which check failed.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token configuration: {0}")]
    Configuration(String),

    #[error("Access token is invalid: {0}")]
    InvalidSignature(String),

    #[error("Refresh token is invalid: {0}")]
    InvalidRefresh(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is untracked")]
    Untracked,

    #[error("Refresh token does not match the one paired with the access token")]
    RefreshMismatch,

    #[error("Cache read failed for key {key}: {source}")]
    CacheRead {
        key: String,
        source: SessionStoreError,
    },

    #[error("Cache write failed for key {key}: {source}")]
    CacheWrite {
        key: String,
        source: SessionStoreError,
    },

    #[error("Corrupt cache entry for key {key}: {reason}")]
    CorruptEntry { key: String, reason: String },
}
