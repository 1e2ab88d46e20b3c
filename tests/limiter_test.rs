//! Fixed-window rate limiter behaviour.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tutorhive::store::{KeyValueStore, MemoryStore};
use tutorhive::{LimitCategory, RateLimiter, Result, TutorHiveError};

struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(TutorHiveError::Store("connection refused".into()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(TutorHiveError::Store("connection refused".into()))
    }

    async fn incr(&self, _key: &str) -> Result<i64> {
        Err(TutorHiveError::Store("connection refused".into()))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<()> {
        Err(TutorHiveError::Store("connection refused".into()))
    }

    async fn ttl_remaining(&self, _key: &str) -> Result<Option<Duration>> {
        Err(TutorHiveError::Store("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(TutorHiveError::Store("connection refused".into()))
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
        Err(TutorHiveError::Store("connection refused".into()))
    }
}

#[tokio::test]
async fn admits_up_to_the_budget_then_rejects() {
    let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));

    for _ in 0..10 {
        limiter.check("kid-1", LimitCategory::Quiz).await.unwrap();
    }

    let err = limiter
        .check("kid-1", LimitCategory::Quiz)
        .await
        .unwrap_err();
    match err {
        TutorHiveError::QuotaExceeded {
            limit,
            retry_after_secs,
        } => {
            assert_eq!(limit, "quiz generations");
            assert!(retry_after_secs >= 1);
        }
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn scopes_and_categories_have_independent_budgets() {
    let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));

    for _ in 0..10 {
        limiter.check("kid-1", LimitCategory::Quiz).await.unwrap();
    }

    // A different scope and a different category are both unaffected.
    limiter.check("kid-2", LimitCategory::Quiz).await.unwrap();
    limiter.check("kid-1", LimitCategory::Chat).await.unwrap();
}

#[tokio::test]
async fn remaining_counts_down_from_the_budget() {
    let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));

    assert_eq!(limiter.remaining("kid-1", LimitCategory::Auth).await, 5);
    limiter.check("kid-1", LimitCategory::Auth).await.unwrap();
    limiter.check("kid-1", LimitCategory::Auth).await.unwrap();
    assert_eq!(limiter.remaining("kid-1", LimitCategory::Auth).await, 3);
}

#[tokio::test]
async fn window_rollover_restarts_the_count() {
    let store = Arc::new(MemoryStore::new());
    let limiter = RateLimiter::new(store.clone());

    for _ in 0..10 {
        limiter.check("kid-1", LimitCategory::Quiz).await.unwrap();
    }
    assert!(limiter.check("kid-1", LimitCategory::Quiz).await.is_err());

    // Force the window key to expire instead of waiting an hour.
    store
        .expire("rate_limit:quiz:kid-1", Duration::from_millis(10))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    limiter.check("kid-1", LimitCategory::Quiz).await.unwrap();
    assert_eq!(limiter.remaining("kid-1", LimitCategory::Quiz).await, 9);
}

#[tokio::test]
async fn reset_reopens_the_budget_immediately() {
    let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));

    for _ in 0..5 {
        limiter.check("kid-1", LimitCategory::Auth).await.unwrap();
    }
    assert!(limiter.check("kid-1", LimitCategory::Auth).await.is_err());

    limiter.reset("kid-1", LimitCategory::Auth).await;
    limiter.check("kid-1", LimitCategory::Auth).await.unwrap();
}

#[tokio::test]
async fn time_until_reset_tracks_the_window() {
    let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));

    assert_eq!(
        limiter.time_until_reset("kid-1", LimitCategory::Chat).await,
        0
    );
    limiter.check("kid-1", LimitCategory::Chat).await.unwrap();
    let secs = limiter.time_until_reset("kid-1", LimitCategory::Chat).await;
    assert!(secs > 0 && secs <= 3600);
}

#[tokio::test]
async fn broken_store_fails_open() {
    let limiter = RateLimiter::new(Arc::new(BrokenStore));

    // Every request is admitted when the store is unreachable.
    for _ in 0..200 {
        limiter.check("kid-1", LimitCategory::Chat).await.unwrap();
    }
    assert_eq!(limiter.remaining("kid-1", LimitCategory::Chat).await, 100);
}

#[tokio::test]
async fn concurrent_checks_never_exceed_the_budget() {
    let limiter = Arc::new(RateLimiter::new(Arc::new(MemoryStore::new())));

    let mut handles = Vec::new();
    for _ in 0..30 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            limiter.check("kid-1", LimitCategory::Quiz).await.is_ok()
        }));
    }

    let mut admitted = 0;
    for h in handles {
        if h.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 10, "exactly the budget must be admitted");
}
