use std::time::Duration;

use async_trait::async_trait;

use crate::domain::token::errors::SessionStoreError;
use crate::domain::token::errors::TokenError;
use crate::domain::token::models::AccessClaims;
use crate::domain::token::models::CredentialId;
use crate::domain::token::models::RefreshClaims;
use crate::domain::token::models::Role;
use crate::domain::token::models::SubjectId;
use crate::domain::token::models::TokenPair;

/// Port for token lifecycle operations.
#[async_trait]
pub trait TokenServicePort: Send + Sync + 'static {
    /// Issue a fresh access/refresh credential pair for a subject.
    ///
    /// Writes both session-cache entries with TTLs matching each
    /// credential's expiry before returning the signed strings.
    ///
    /// # Errors
    /// * `Configuration` - Signing failed due to bad configuration
    /// * `CacheWrite` - A cache write failed; the caller should treat the
    ///   issuance as unusable and retry it whole
    async fn issue(&self, subject_id: SubjectId, role: Role) -> Result<TokenPair, TokenError>;

    /// Verify and decode an access credential string.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature verification failed or malformed
    /// * `Expired` - The credential's expiry has passed
    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError>;

    /// Verify and decode a refresh credential string.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature verification failed or malformed
    /// * `Expired` - The credential's expiry has passed
    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError>;

    /// Check whether an access credential is still live in the cache.
    ///
    /// A cache miss returns `false`, not an error: miss and explicit
    /// revoke are observably identical to callers.
    ///
    /// # Errors
    /// * `CacheRead` - The cache lookup failed
    async fn is_live(&self, access_id: &CredentialId) -> Result<bool, TokenError>;

    /// Exchange a still-valid refresh credential for a fresh pair,
    /// revoking the old pair.
    ///
    /// The presented access credential is invalidated whether or not the
    /// rotation succeeds. A refresh credential that was not co-issued with
    /// the presented access credential is a replay signal: its own cache
    /// entry is revoked too and the call fails with `RefreshMismatch`.
    ///
    /// # Errors
    /// * `Untracked` - The access credential is no longer live
    /// * `InvalidRefresh` - The refresh string failed signature or expiry checks
    /// * `RefreshMismatch` - The refresh credential belongs to a different issuance
    /// * `CacheRead` / `CacheWrite` - A cache operation failed
    async fn rotate(
        &self,
        access_claims: &AccessClaims,
        refresh_token: &str,
    ) -> Result<TokenPair, TokenError>;

    /// Revoke both cache entries of a credential pair (explicit logout).
    ///
    /// Idempotent: already-absent entries are logged, not surfaced.
    ///
    /// # Errors
    /// * `CacheRead` / `CacheWrite` - A cache operation failed after retry
    async fn revoke(&self, access_id: &CredentialId) -> Result<(), TokenError>;
}

/// Key-value session store recording live credential identifiers.
///
/// Two logical key spaces share the store: `access_id -> AccessEntry`
/// (JSON) and `refresh_id -> subject_id`. Implementations must bound every
/// call with a timeout; TTL-based expiry is the store's own passive
/// destruction mechanism.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Fetch the value stored under a key, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Store a value under a key with a per-key TTL.
    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    /// Delete the entry under a key. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), SessionStoreError>;
}
