use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::code::errors::CodeRepositoryError;
use crate::domain::code::models::Code;
use crate::domain::code::models::CodeId;
use crate::domain::code::models::NewCode;
use crate::domain::code::models::Purpose;
use crate::domain::code::ports::CodeRepository;
use crate::domain::token::models::SubjectId;

/// PostgreSQL implementation of CodeRepository.
///
/// Rows are append-only apart from expiry extension and the used flag;
/// consumed codes are retained for audit, never deleted here.
pub struct PostgresCodeRepository {
    pool: PgPool,
}

impl PostgresCodeRepository {
    /// Create a new PostgreSQL code repository.
    ///
    /// # Arguments
    /// * `pool` - PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_code(row: &PgRow) -> Result<Code, CodeRepositoryError> {
    let purpose_text: String = row.get("purpose");
    let purpose = Purpose::from_string(&purpose_text).ok_or_else(|| {
        CodeRepositoryError::Database(format!("Unknown purpose in codes row: {}", purpose_text))
    })?;

    Ok(Code {
        id: CodeId(row.get::<i64, _>("id")),
        code: row.get("code"),
        subject_id: SubjectId(row.get::<i64, _>("subject_id")),
        purpose,
        payload: row.get("payload"),
        is_used: row.get("is_used"),
        expires_at: row.get::<DateTime<Utc>, _>("expires_at"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

#[async_trait]
impl CodeRepository for PostgresCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Code>, CodeRepositoryError> {
        // Code values repeat across history; the newest row is the one a
        // presenter can legitimately hold.
        let row = sqlx::query(
            r#"
            SELECT id, code, subject_id, purpose, payload, is_used, expires_at, created_at
            FROM codes
            WHERE code = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CodeRepositoryError::Database(e.to_string()))?;

        row.as_ref().map(row_to_code).transpose()
    }

    async fn find_active_by_purpose(
        &self,
        subject_id: SubjectId,
        purpose: Purpose,
    ) -> Result<Option<Code>, CodeRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, code, subject_id, purpose, payload, is_used, expires_at, created_at
            FROM codes
            WHERE subject_id = $1 AND purpose = $2 AND is_used = FALSE AND expires_at > NOW()
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(subject_id.0)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CodeRepositoryError::Database(e.to_string()))?;

        row.as_ref().map(row_to_code).transpose()
    }

    async fn insert(&self, code: NewCode) -> Result<Code, CodeRepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO codes (code, subject_id, purpose, payload, is_used, expires_at, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&code.code)
        .bind(code.subject_id.0)
        .bind(code.purpose.as_str())
        .bind(&code.payload)
        .bind(code.expires_at)
        .bind(code.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CodeRepositoryError::Database(e.to_string()))?;

        Ok(Code {
            id: CodeId(row.get::<i64, _>("id")),
            code: code.code,
            subject_id: code.subject_id,
            purpose: code.purpose,
            payload: code.payload,
            is_used: false,
            expires_at: code.expires_at,
            created_at: code.created_at,
        })
    }

    async fn update_expiry(
        &self,
        id: CodeId,
        expires_at: DateTime<Utc>,
        payload: &str,
    ) -> Result<(), CodeRepositoryError> {
        sqlx::query(
            r#"
            UPDATE codes
            SET expires_at = $2, payload = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(expires_at)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| CodeRepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn mark_used(&self, id: CodeId) -> Result<bool, CodeRepositoryError> {
        // Compare-and-set on is_used: the WHERE clause makes concurrent
        // confirmations of the same row race to a single winner.
        let result = sqlx::query(
            r#"
            UPDATE codes
            SET is_used = TRUE
            WHERE id = $1 AND is_used = FALSE
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| CodeRepositoryError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
