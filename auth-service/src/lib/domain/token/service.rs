use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use credential::Signer;
use credential::SignerError;

use crate::config::TokenConfig;
use crate::domain::token::errors::TokenError;
use crate::domain::token::models::AccessClaims;
use crate::domain::token::models::AccessEntry;
use crate::domain::token::models::CredentialId;
use crate::domain::token::models::RefreshClaims;
use crate::domain::token::models::Role;
use crate::domain::token::models::SubjectId;
use crate::domain::token::models::TokenPair;
use crate::domain::token::ports::SessionStore;
use crate::domain::token::ports::TokenServicePort;

/// Token lifecycle engine.
///
/// Orchestrates issuance (codec + cache writes), decoding, liveness
/// lookups, and the revoke-then-compare rotation protocol. The session
/// store is the single source of truth for whether a credential is alive.
pub struct TokenService<S>
where
    S: SessionStore,
{
    store: Arc<S>,
    access_signer: Signer,
    refresh_signer: Signer,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl<S> TokenService<S>
where
    S: SessionStore,
{
    /// Create a new token service from explicit configuration.
    ///
    /// # Errors
    /// * `Configuration` - A secret is empty or a TTL is not positive
    pub fn new(store: Arc<S>, config: &TokenConfig) -> Result<Self, TokenError> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(TokenError::Configuration(
                "token secrets must not be empty".to_string(),
            ));
        }
        if config.access_exp_minutes <= 0 || config.refresh_exp_minutes <= 0 {
            return Err(TokenError::Configuration(
                "token expiration minutes must be positive".to_string(),
            ));
        }

        Ok(Self {
            store,
            access_signer: Signer::new(config.access_secret.as_bytes()),
            refresh_signer: Signer::new(config.refresh_secret.as_bytes()),
            access_ttl: chrono::Duration::minutes(config.access_exp_minutes),
            refresh_ttl: chrono::Duration::minutes(config.refresh_exp_minutes),
        })
    }

    fn map_signer_error(err: SignerError) -> TokenError {
        match err {
            SignerError::Expired => TokenError::Expired,
            SignerError::InvalidToken(reason) => TokenError::InvalidSignature(reason),
            SignerError::EncodingFailed(reason) => TokenError::Configuration(reason),
        }
    }

    /// Delete a cache key, retrying once.
    ///
    /// A half-revoked pair could otherwise remain falsely live, so a failed
    /// delete is retried before the error is surfaced.
    async fn delete_with_retry(&self, key: &str) -> Result<(), TokenError> {
        if let Err(first) = self.store.delete(key).await {
            tracing::warn!(key = %key, error = %first, "Cache delete failed, retrying once");
            self.store
                .delete(key)
                .await
                .map_err(|source| TokenError::CacheWrite {
                    key: key.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    async fn read_access_entry(&self, key: &str) -> Result<Option<AccessEntry>, TokenError> {
        let raw = self
            .store
            .get(key)
            .await
            .map_err(|source| TokenError::CacheRead {
                key: key.to_string(),
                source,
            })?;

        match raw {
            Some(json) => {
                let entry: AccessEntry =
                    serde_json::from_str(&json).map_err(|e| TokenError::CorruptEntry {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S> TokenServicePort for TokenService<S>
where
    S: SessionStore,
{
    async fn issue(&self, subject_id: SubjectId, role: Role) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let access_id = CredentialId::new();
        let refresh_id = CredentialId::new();

        let access_claims = AccessClaims {
            access_id,
            subject_id,
            role,
            exp: (now + self.access_ttl).timestamp(),
        };
        let refresh_claims = RefreshClaims {
            refresh_id,
            subject_id,
            role,
            exp: (now + self.refresh_ttl).timestamp(),
        };

        let access_token = self
            .access_signer
            .encode(&access_claims)
            .map_err(Self::map_signer_error)?;
        let refresh_token = self
            .refresh_signer
            .encode(&refresh_claims)
            .map_err(Self::map_signer_error)?;

        let entry = AccessEntry {
            subject_id,
            refresh_id,
        };
        let entry_json = serde_json::to_string(&entry).map_err(|e| TokenError::CorruptEntry {
            key: access_id.to_string(),
            reason: e.to_string(),
        })?;

        let access_ttl = Duration::from_secs(self.access_ttl.num_seconds() as u64);
        let refresh_ttl = Duration::from_secs(self.refresh_ttl.num_seconds() as u64);

        // The pair is live only once both writes land; a partial pair is
        // unusable and the whole issuance must be retried by the caller.
        self.store
            .set_with_ttl(&access_id.to_string(), &entry_json, access_ttl)
            .await
            .map_err(|source| TokenError::CacheWrite {
                key: access_id.to_string(),
                source,
            })?;
        self.store
            .set_with_ttl(&refresh_id.to_string(), &subject_id.to_string(), refresh_ttl)
            .await
            .map_err(|source| TokenError::CacheWrite {
                key: refresh_id.to_string(),
                source,
            })?;

        tracing::info!(
            subject_id = %subject_id,
            access_id = %access_id,
            refresh_id = %refresh_id,
            "Credential pair issued"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.access_signer
            .decode(token)
            .map_err(Self::map_signer_error)
    }

    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.refresh_signer
            .decode(token)
            .map_err(Self::map_signer_error)
    }

    async fn is_live(&self, access_id: &CredentialId) -> Result<bool, TokenError> {
        let key = access_id.to_string();
        let value = self
            .store
            .get(&key)
            .await
            .map_err(|source| TokenError::CacheRead { key, source })?;
        Ok(value.is_some())
    }

    async fn rotate(
        &self,
        access_claims: &AccessClaims,
        refresh_token: &str,
    ) -> Result<TokenPair, TokenError> {
        let access_key = access_claims.access_id.to_string();

        // Step 1: the access credential must still be tracked. Its
        // signature may verify even after the cache entry is gone, since
        // signature expiry and cache TTL match but are not coupled.
        let entry = self
            .read_access_entry(&access_key)
            .await?
            .ok_or(TokenError::Untracked)?;

        // Step 2: validate the presented refresh string. Any signature or
        // expiry failure is reported as a bad refresh token.
        let refresh_claims: RefreshClaims = self
            .refresh_signer
            .decode(refresh_token)
            .map_err(|e| TokenError::InvalidRefresh(e.to_string()))?;

        // Step 3: revoke the access credential's entire pair before any
        // comparison. A refresh attempt, successful or not, always burns
        // the presented access session; comparing first would let an
        // attacker keep the old pair alive by repeatedly failing rotation.
        self.delete_with_retry(&entry.refresh_id.to_string()).await?;
        self.delete_with_retry(&access_key).await?;

        // Step 4: compare against the pairing captured in step 1.
        if refresh_claims.refresh_id != entry.refresh_id {
            tracing::warn!(
                subject_id = %entry.subject_id,
                access_id = %access_claims.access_id,
                presented_refresh_id = %refresh_claims.refresh_id,
                paired_refresh_id = %entry.refresh_id,
                "Refresh token mismatch, possible credential theft"
            );
            // The presented refresh credential may belong to a stolen
            // session; burn its own entry too. Best-effort cleanup.
            if let Err(e) = self.store.delete(&refresh_claims.refresh_id.to_string()).await {
                tracing::warn!(
                    key = %refresh_claims.refresh_id,
                    error = %e,
                    "Failed to drop mismatched refresh entry"
                );
            }
            return Err(TokenError::RefreshMismatch);
        }

        // Step 5: reissue for the subject carried in the refresh claims.
        self.issue(refresh_claims.subject_id, refresh_claims.role)
            .await
    }

    async fn revoke(&self, access_id: &CredentialId) -> Result<(), TokenError> {
        let access_key = access_id.to_string();

        match self.read_access_entry(&access_key).await {
            Ok(Some(entry)) => {
                self.delete_with_retry(&entry.refresh_id.to_string()).await?;
                self.delete_with_retry(&access_key).await?;
                tracing::info!(
                    subject_id = %entry.subject_id,
                    access_id = %access_id,
                    "Credential pair revoked"
                );
                Ok(())
            }
            // Double-revoke is idempotent: miss and explicit revoke are
            // observably identical.
            Ok(None) => {
                tracing::debug!(access_id = %access_id, "Revoke of already-absent pair");
                Ok(())
            }
            // The paired refresh ID is unrecoverable; still drop the
            // access entry so the pair cannot be considered live.
            Err(TokenError::CorruptEntry { key, reason }) => {
                tracing::warn!(key = %key, reason = %reason, "Corrupt access entry on revoke");
                self.delete_with_retry(&access_key).await
            }
            Err(e) => Err(e),
        }
    }
}
