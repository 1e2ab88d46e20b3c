//! In-process store backed by a concurrent hash map.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::KeyValueStore;
use crate::Result;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory [`KeyValueStore`].
///
/// Expiry is enforced lazily on read; expired entries are dropped the
/// first time they are touched. Per-key atomicity comes from the map's
/// shard locks, which also makes `incr` an atomic increment-and-read.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Drop expired entries on touch.
        self.entries.remove_if(key, |_, e| e.is_expired());
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: "0".to_string(),
            expires_at: None,
        });
        if entry.is_expired() {
            entry.value = "0".to_string();
            entry.expires_at = None;
        }
        let next = entry.value.parse::<i64>().unwrap_or(0) + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        if let Some(mut entry) = self.entries.get_mut(key) {
            if !entry.is_expired() {
                entry.expires_at = Some(Instant::now() + ttl);
            }
        }
        Ok(())
    }

    async fn ttl_remaining(&self, key: &str) -> Result<Option<Duration>> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(entry
                .expires_at
                .map(|at| at.saturating_duration_since(Instant::now()))),
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix) && !e.value().is_expired())
            .map(|e| e.key().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("k", "v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn incr_counts_from_one() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("c").await.unwrap(), 1);
        assert_eq!(store.incr("c").await.unwrap(), 2);
        assert_eq!(store.incr("c").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn incr_restarts_after_expiry() {
        let store = MemoryStore::new();
        store.incr("c").await.unwrap();
        store.expire("c", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.incr("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn prefix_scan_skips_expired() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("quiz:a", "1", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_with_ttl("quiz:b", "2", Duration::from_millis(10))
            .await
            .unwrap();
        store
            .set_with_ttl("hint:c", "3", Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let keys = store.keys_with_prefix("quiz:").await.unwrap();
        assert_eq!(keys, vec!["quiz:a".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_incr_is_lossless() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    store.incr("c").await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.get("c").await.unwrap(), Some("800".to_string()));
    }
}
