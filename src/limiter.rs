//! Fixed-window rate limiter over the shared key-value store.
//!
//! One counter per (scope, category) pair, where scope is typically a
//! user or subject identifier. The counter lives in the shared store so
//! all process instances enforce the same budget; it resets implicitly
//! when the window key expires.
//!
//! Admission uses a single atomic increment: the post-increment value is
//! compared against the limit, so concurrent callers on the same scope
//! cannot admit more than `max_requests` in one window.
//!
//! If the store is unreachable the limiter fails open — an
//! infrastructure outage must not block all traffic.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::store::KeyValueStore;
use crate::telemetry;
use crate::{Result, TutorHiveError};

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Built-in rate-limit categories with distinct budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCategory {
    /// Conversational requests: short window, high frequency.
    Chat,
    /// Quiz generations.
    Quiz,
    /// Authentication attempts.
    Auth,
    /// Aggregate daily question cap: long window, low frequency.
    DailyQuestions,
}

impl LimitCategory {
    /// Maximum requests admitted per window.
    pub fn max_requests(&self) -> i64 {
        match self {
            LimitCategory::Chat => 100,
            LimitCategory::Quiz => 10,
            LimitCategory::Auth => 5,
            LimitCategory::DailyQuestions => 50,
        }
    }

    /// Window length; the counter key expires at the window boundary.
    pub fn window(&self) -> Duration {
        match self {
            LimitCategory::Chat => HOUR,
            LimitCategory::Quiz => HOUR,
            LimitCategory::Auth => HOUR,
            LimitCategory::DailyQuestions => DAY,
        }
    }

    fn key_part(&self) -> &'static str {
        match self {
            LimitCategory::Chat => "chat",
            LimitCategory::Quiz => "quiz",
            LimitCategory::Auth => "auth",
            LimitCategory::DailyQuestions => "daily_questions",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            LimitCategory::Chat => "chat requests",
            LimitCategory::Quiz => "quiz generations",
            LimitCategory::Auth => "authentication attempts",
            LimitCategory::DailyQuestions => "daily questions",
        }
    }
}

impl fmt::Display for LimitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_part())
    }
}

/// Fixed-window request counter.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Admit or reject one request for `scope` under `category`.
    ///
    /// Returns `Err(QuotaExceeded)` with the remaining time to window
    /// reset when the budget is spent. A store failure admits the
    /// request (fail open).
    pub async fn check(&self, scope: &str, category: LimitCategory) -> Result<()> {
        let key = counter_key(scope, category);

        let count = match self.store.incr(&key).await {
            Ok(count) => count,
            Err(e) => {
                warn!(key, error = %e, "rate limit store unreachable, failing open");
                return Ok(());
            }
        };

        // First increment in a fresh window sets the window boundary.
        if count == 1 {
            if let Err(e) = self.store.expire(&key, category.window()).await {
                warn!(key, error = %e, "failed to set rate limit window expiry");
            }
        }

        if count > category.max_requests() {
            let retry_after_secs = self.seconds_until_reset(&key, category).await;
            metrics::counter!(
                telemetry::RATE_LIMIT_REJECTIONS_TOTAL,
                "category" => category.key_part(),
            )
            .increment(1);
            warn!(key, count, "rate limit exceeded");
            return Err(TutorHiveError::QuotaExceeded {
                limit: category.label().to_string(),
                retry_after_secs,
            });
        }

        debug!(key, count, max = category.max_requests(), "request admitted");
        Ok(())
    }

    /// Requests left in the current window. A store failure reports the
    /// full budget.
    pub async fn remaining(&self, scope: &str, category: LimitCategory) -> i64 {
        let key = counter_key(scope, category);
        let count = match self.store.get(&key).await {
            Ok(Some(value)) => value.parse::<i64>().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!(key, error = %e, "rate limit read failed");
                0
            }
        };
        (category.max_requests() - count).max(0)
    }

    /// Seconds until the current window rolls over; 0 if no window is
    /// active.
    pub async fn time_until_reset(&self, scope: &str, category: LimitCategory) -> u64 {
        let key = counter_key(scope, category);
        match self.store.ttl_remaining(&key).await {
            Ok(Some(ttl)) => ttl.as_secs(),
            Ok(None) => 0,
            Err(e) => {
                warn!(key, error = %e, "rate limit ttl read failed");
                0
            }
        }
    }

    /// Clear the counter for a scope, re-opening its budget immediately.
    pub async fn reset(&self, scope: &str, category: LimitCategory) {
        let key = counter_key(scope, category);
        if let Err(e) = self.store.delete(&key).await {
            warn!(key, error = %e, "rate limit reset failed");
        }
    }

    async fn seconds_until_reset(&self, key: &str, category: LimitCategory) -> u64 {
        match self.store.ttl_remaining(key).await {
            Ok(Some(ttl)) => ttl.as_secs().max(1),
            // No expiry recorded (e.g. the expire call failed earlier);
            // report the full window rather than zero.
            Ok(None) => category.window().as_secs(),
            Err(_) => category.window().as_secs(),
        }
    }
}

fn counter_key(scope: &str, category: LimitCategory) -> String {
    format!("rate_limit:{}:{}", category.key_part(), scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_keys_separate_categories_and_scopes() {
        let a = counter_key("child-1", LimitCategory::Chat);
        let b = counter_key("child-1", LimitCategory::Quiz);
        let c = counter_key("child-2", LimitCategory::Chat);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("rate_limit:chat:"));
    }

    #[test]
    fn budgets_match_documented_limits() {
        assert_eq!(LimitCategory::Chat.max_requests(), 100);
        assert_eq!(LimitCategory::Quiz.max_requests(), 10);
        assert_eq!(LimitCategory::Auth.max_requests(), 5);
        assert_eq!(LimitCategory::DailyQuestions.max_requests(), 50);
        assert_eq!(LimitCategory::DailyQuestions.window(), DAY);
    }
}
