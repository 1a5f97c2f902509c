use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::config::CodeConfig;
use crate::domain::code::errors::CodeError;
use crate::domain::code::models::Code;
use crate::domain::code::models::NewCode;
use crate::domain::code::models::Purpose;
use crate::domain::code::ports::CodeRepository;
use crate::domain::code::ports::CodeServicePort;
use crate::domain::token::models::SubjectId;

const CODE_LENGTH: usize = 6;

/// Confirmation code engine.
///
/// Generates short numeric codes, enforces the single-active-code
/// invariant per (subject, purpose), and consumes codes exactly once.
pub struct CodeService<R>
where
    R: CodeRepository,
{
    repository: Arc<R>,
    code_ttl: chrono::Duration,
}

impl<R> CodeService<R>
where
    R: CodeRepository,
{
    /// Create a new code service from explicit configuration.
    ///
    /// # Errors
    /// * `Configuration` - The code TTL is not positive
    pub fn new(repository: Arc<R>, config: &CodeConfig) -> Result<Self, CodeError> {
        if config.exp_minutes <= 0 {
            return Err(CodeError::Configuration(
                "code expiration minutes must be positive".to_string(),
            ));
        }

        Ok(Self {
            repository,
            code_ttl: chrono::Duration::minutes(config.exp_minutes),
        })
    }
}

/// Generate a six-digit numeric code, uniform per digit position.
///
/// Stored as text so leading zeros survive; values are not required to be
/// unique across history, only one active per (subject, purpose).
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[async_trait]
impl<R> CodeServicePort for CodeService<R>
where
    R: CodeRepository,
{
    async fn issue_or_extend(
        &self,
        subject_id: SubjectId,
        purpose: Purpose,
        payload: String,
    ) -> Result<Code, CodeError> {
        let now = Utc::now();
        let expires_at = now + self.code_ttl;

        match self
            .repository
            .find_active_by_purpose(subject_id, purpose)
            .await?
        {
            // A retried request extends the existing code in place and
            // must carry the newest payload (the reset flow sends a fresh
            // pre-hashed password candidate each time).
            Some(mut active) => {
                self.repository
                    .update_expiry(active.id, expires_at, &payload)
                    .await?;
                active.expires_at = expires_at;
                active.payload = payload;

                tracing::debug!(
                    subject_id = %subject_id,
                    purpose = %purpose,
                    code_id = %active.id,
                    "Active confirmation code extended"
                );
                Ok(active)
            }
            None => {
                let created = self
                    .repository
                    .insert(NewCode {
                        code: generate_code(),
                        subject_id,
                        purpose,
                        payload,
                        expires_at,
                        created_at: now,
                    })
                    .await?;

                tracing::info!(
                    subject_id = %subject_id,
                    purpose = %purpose,
                    code_id = %created.id,
                    "Confirmation code issued"
                );
                Ok(created)
            }
        }
    }

    async fn resolve(&self, code_value: &str) -> Result<Code, CodeError> {
        let code = self
            .repository
            .find_by_code(code_value)
            .await?
            .ok_or(CodeError::NotFound)?;

        if code.is_expired(Utc::now()) {
            return Err(CodeError::Expired);
        }
        if code.is_used {
            return Err(CodeError::AlreadyUsed);
        }

        Ok(code)
    }

    async fn confirm(&self, code: &Code) -> Result<(), CodeError> {
        // is_used is re-checked at the store, not just at resolve time: a
        // concurrent confirmation of the same code loses the compare-and-set.
        let transitioned = self.repository.mark_used(code.id).await?;
        if !transitioned {
            tracing::warn!(
                subject_id = %code.subject_id,
                purpose = %code.purpose,
                code_id = %code.id,
                "Confirmation lost the mark-used race, possible replay"
            );
            return Err(CodeError::AlreadyUsed);
        }

        tracing::info!(
            subject_id = %code.subject_id,
            purpose = %code.purpose,
            code_id = %code.id,
            "Confirmation code consumed"
        );
        Ok(())
    }
}
