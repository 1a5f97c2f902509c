use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::token::errors::SessionStoreError;
use crate::domain::token::ports::SessionStore;

/// Redis implementation of the session store.
///
/// Every round-trip is bounded by the configured timeout; a timed-out call
/// surfaces as `SessionStoreError::Timeout` so the engine can apply its
/// retry policy. Per-key TTLs map onto `SET ... EX`.
#[derive(Clone)]
pub struct RedisSessionStore {
    manager: ConnectionManager,
    timeout: Duration,
}

impl RedisSessionStore {
    /// Connect to Redis and build a managed-connection store.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL
    /// * `timeout` - Upper bound for a single cache round-trip
    ///
    /// # Errors
    /// * `Backend` - The client could not be created or the connection failed
    pub async fn new(url: &str, timeout: Duration) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| SessionStoreError::Backend(format!("Redis client error: {}", e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| SessionStoreError::Backend(format!("Redis connection error: {}", e)))?;

        Ok(Self { manager, timeout })
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, redis::RedisError>>,
    ) -> Result<T, SessionStoreError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| SessionStoreError::Timeout(self.timeout))?
            .map_err(|e| SessionStoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let mut conn = self.manager.clone();
        self.bounded(conn.get::<_, Option<String>>(key)).await
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut conn = self.manager.clone();
        // Redis rejects zero expiry; clamp to the shortest expressible TTL.
        let ttl_secs = ttl.as_secs().max(1);
        self.bounded(conn.set_ex::<_, _, ()>(key, value, ttl_secs))
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.manager.clone();
        self.bounded(conn.del::<_, ()>(key)).await
    }
}
