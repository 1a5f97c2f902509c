use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::Once;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use auth_service::code::errors::CodeRepositoryError;
use auth_service::code::models::Code;
use auth_service::code::models::CodeId;
use auth_service::code::models::NewCode;
use auth_service::code::models::Purpose;
use auth_service::code::ports::CodeRepository;
use auth_service::code::service::CodeService;
use auth_service::config::CodeConfig;
use auth_service::config::TokenConfig;
use auth_service::token::errors::SessionStoreError;
use auth_service::token::models::SubjectId;
use auth_service::token::ports::SessionStore;
use auth_service::token::service::TokenService;
use chrono::DateTime;
use chrono::Utc;

static TRACING: Once = Once::new();

/// Initialize test logging once per binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "auth_service=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// In-memory session store honoring per-key TTLs.
///
/// Stands in for Redis so the lifecycle suites run without live infra.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct lookup for asserting on cache state in tests.
    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .map(|(_, expires)| *expires > Instant::now())
            .unwrap_or(false)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}

/// In-memory code repository with the same compare-and-set semantics as
/// the PostgreSQL adapter.
#[derive(Default)]
pub struct InMemoryCodeRepository {
    rows: Mutex<Vec<Code>>,
}

impl InMemoryCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing the service (e.g. an expired code).
    pub fn seed(&self, code: Code) {
        self.rows.lock().unwrap().push(code);
    }
}

#[async_trait]
impl CodeRepository for InMemoryCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Code>, CodeRepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.code == code)
            .max_by_key(|row| row.created_at)
            .cloned())
    }

    async fn find_active_by_purpose(
        &self,
        subject_id: SubjectId,
        purpose: Purpose,
    ) -> Result<Option<Code>, CodeRepositoryError> {
        let now = Utc::now();
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| {
                row.subject_id == subject_id
                    && row.purpose == purpose
                    && !row.is_used
                    && row.expires_at > now
            })
            .max_by_key(|row| row.created_at)
            .cloned())
    }

    async fn insert(&self, code: NewCode) -> Result<Code, CodeRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let row = Code {
            id: CodeId(rows.len() as i64 + 1),
            code: code.code,
            subject_id: code.subject_id,
            purpose: code.purpose,
            payload: code.payload,
            is_used: false,
            expires_at: code.expires_at,
            created_at: code.created_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update_expiry(
        &self,
        id: CodeId,
        expires_at: DateTime<Utc>,
        payload: &str,
    ) -> Result<(), CodeRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| CodeRepositoryError::Database(format!("no row with id {}", id)))?;
        row.expires_at = expires_at;
        row.payload = payload.to_string();
        Ok(())
    }

    async fn mark_used(&self, id: CodeId) -> Result<bool, CodeRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.id == id && !row.is_used) {
            Some(row) => {
                row.is_used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub fn token_config() -> TokenConfig {
    TokenConfig {
        access_secret: "test-access-secret-at-least-32-bytes!".to_string(),
        refresh_secret: "test-refresh-secret-at-least-32-byte!".to_string(),
        access_exp_minutes: 15,
        refresh_exp_minutes: 60 * 24 * 7,
    }
}

pub fn token_service(store: Arc<InMemorySessionStore>) -> TokenService<InMemorySessionStore> {
    init_tracing();
    TokenService::new(store, &token_config()).expect("Failed to build token service")
}

pub fn code_service(repo: Arc<InMemoryCodeRepository>) -> CodeService<InMemoryCodeRepository> {
    init_tracing();
    CodeService::new(repo, &CodeConfig { exp_minutes: 30 }).expect("Failed to build code service")
}
