//! Redis-backed store for shared deployments.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use super::KeyValueStore;
use crate::{Result, TutorHiveError};

/// [`KeyValueStore`] backed by redis.
///
/// Uses a connection manager so individual operations survive broken
/// connections; persistent outages surface as `Store` errors, which
/// callers treat as cache misses / limiter fail-open.
pub struct RedisStore {
    connection: redis::aio::ConnectionManager,
}

impl RedisStore {
    /// Connect to redis at `connection_string` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let client = redis::Client::open(connection_string)
            .map_err(|e| TutorHiveError::Configuration(e.to_string()))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(store_err)?;
        Ok(Self { connection })
    }
}

fn store_err(e: redis::RedisError) -> TutorHiveError {
    TutorHiveError::Store(e.to_string())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get(key).await.map_err(store_err)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        conn.set_ex(key, value, ttl.as_secs().max(1))
            .await
            .map_err(store_err)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection.clone();
        conn.incr(key, 1).await.map_err(store_err)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: bool = conn
            .expire(key, ttl.as_secs().max(1) as i64)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.connection.clone();
        let secs: i64 = conn.ttl(key).await.map_err(store_err)?;
        // -2 = no key, -1 = no expiry
        if secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(secs as u64)))
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: u64 = conn.del(key).await.map_err(store_err)?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.connection.clone();
        conn.keys(format!("{prefix}*")).await.map_err(store_err)
    }
}
