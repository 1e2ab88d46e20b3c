//! Shared key-value store abstraction.
//!
//! The response cache and the rate limiter both persist their state in a
//! TTL-capable key-value store shared by all process instances. The
//! [`KeyValueStore`] trait keeps them backend-agnostic:
//!
//! - [`MemoryStore`] — in-process, for tests and single-node deployments.
//! - [`RedisStore`] — redis-backed, for shared deployments.
//!
//! Store failures are reported as [`TutorHiveError::Store`] and are
//! always handled fail-open by callers: a broken store degrades caching
//! and rate limiting, it never fails a request.
//!
//! [`TutorHiveError::Store`]: crate::TutorHiveError::Store

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// TTL-capable string key-value store.
///
/// Individual key operations are serialized by the backend, so callers
/// need no in-process locking. `incr` is atomic: the returned
/// post-increment value can be compared against a limit without a
/// read-then-write race.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value. `None` for absent or expired keys.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value with an expiry. Overwrites any existing entry.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Atomically increment a counter, creating it at 1 if absent.
    /// Returns the post-increment value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Set the expiry of an existing key.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Remaining time until the key expires. `None` if the key is absent
    /// or has no expiry.
    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List all live keys starting with `prefix`.
    ///
    /// Used for category invalidation and stats; prefixes are coarse
    /// (one per cache category), so the scan stays bounded.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
