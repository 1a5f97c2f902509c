use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::code::errors::CodeError;
use crate::domain::code::errors::CodeRepositoryError;
use crate::domain::code::models::Code;
use crate::domain::code::models::CodeId;
use crate::domain::code::models::NewCode;
use crate::domain::code::models::Purpose;
use crate::domain::token::models::SubjectId;

/// Port for confirmation code operations.
#[async_trait]
pub trait CodeServicePort: Send + Sync + 'static {
    /// Mint a code for a subject/purpose pair, or extend the active one.
    ///
    /// At most one active code may exist per (subject, purpose): if one is
    /// found, its expiry is pushed out in place and its payload replaced
    /// with the latest value; otherwise a fresh six-digit code is
    /// generated and persisted.
    ///
    /// # Errors
    /// * `Repository` - The lookup or write failed
    async fn issue_or_extend(
        &self,
        subject_id: SubjectId,
        purpose: Purpose,
        payload: String,
    ) -> Result<Code, CodeError>;

    /// Resolve a presented code value back into its pending action.
    ///
    /// # Errors
    /// * `NotFound` - No row matches the code value
    /// * `Expired` - The code's expiry has passed
    /// * `AlreadyUsed` - The code was already consumed
    /// * `Repository` - The lookup failed
    async fn resolve(&self, code_value: &str) -> Result<Code, CodeError>;

    /// Consume a resolved code, marking it used exactly once.
    ///
    /// Re-checks `is_used` at the store level (compare-and-set), closing
    /// the window against a concurrent confirmation of the same code.
    ///
    /// # Errors
    /// * `AlreadyUsed` - Another call consumed the code first
    /// * `Repository` - The write failed
    async fn confirm(&self, code: &Code) -> Result<(), CodeError>;
}

/// Persistence operations for confirmation codes.
#[async_trait]
pub trait CodeRepository: Send + Sync + 'static {
    /// Retrieve the newest row matching a code value.
    ///
    /// Code values are not unique across history, only per active
    /// (subject, purpose) slot; the newest row is the relevant one.
    async fn find_by_code(&self, code: &str) -> Result<Option<Code>, CodeRepositoryError>;

    /// Retrieve the active (unused, unexpired) code for a subject and purpose.
    async fn find_active_by_purpose(
        &self,
        subject_id: SubjectId,
        purpose: Purpose,
    ) -> Result<Option<Code>, CodeRepositoryError>;

    /// Persist a new code row and return it with its assigned ID.
    async fn insert(&self, code: NewCode) -> Result<Code, CodeRepositoryError>;

    /// Push out a row's expiry in place and replace its payload.
    async fn update_expiry(
        &self,
        id: CodeId,
        expires_at: DateTime<Utc>,
        payload: &str,
    ) -> Result<(), CodeRepositoryError>;

    /// Mark a row used if and only if it is not used yet.
    ///
    /// Returns whether the row transitioned. Must be atomic with respect
    /// to concurrent calls (row lock or compare-and-set on `is_used`).
    async fn mark_used(&self, id: CodeId) -> Result<bool, CodeRepositoryError>;
}
