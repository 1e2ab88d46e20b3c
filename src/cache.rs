//! Content-addressed response cache.
//!
//! Caches generated content in the shared [`KeyValueStore`], keyed by a
//! fingerprint of the operation and its normalized parameters. Identical
//! logical requests — differing only by case or whitespace — hash to the
//! same key, so the second request never reaches a provider.
//!
//! The cache is a performance optimization, not a correctness
//! dependency: every store failure is logged and treated as a miss (on
//! read) or a no-op (on write). Callers never see a store error.
//!
//! # Key scheme
//!
//! `<category prefix><first 16 hex chars of SHA-256(op ":" params...)>`
//!
//! The digest is stable across processes, which matters because the
//! store is shared; the category prefix lets one category be enumerated
//! or invalidated without touching the others.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::store::KeyValueStore;
use crate::telemetry;
use crate::types::{Question, QuizGenerationResult};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache categories, one per operation family.
///
/// Quiz question sets and subject classifications are long-lived (low
/// churn, high reuse value); free-text responses and hints are
/// medium-lived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCategory {
    Quiz,
    Response,
    Hint,
    Subject,
}

impl CacheCategory {
    /// All categories, for stats and bulk operations.
    pub const ALL: [CacheCategory; 4] = [
        CacheCategory::Quiz,
        CacheCategory::Response,
        CacheCategory::Hint,
        CacheCategory::Subject,
    ];

    /// Key namespace prefix in the shared store.
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheCategory::Quiz => "quiz:",
            CacheCategory::Response => "response:",
            CacheCategory::Hint => "hint:",
            CacheCategory::Subject => "subject:",
        }
    }

    /// Time-to-live applied at insertion.
    pub fn ttl(&self) -> Duration {
        match self {
            CacheCategory::Quiz => 30 * DAY,
            CacheCategory::Response => 7 * DAY,
            CacheCategory::Hint => 7 * DAY,
            CacheCategory::Subject => 30 * DAY,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CacheCategory::Quiz => "quiz",
            CacheCategory::Response => "response",
            CacheCategory::Hint => "hint",
            CacheCategory::Subject => "subject",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entry counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub quiz: u64,
    pub response: u64,
    pub hint: u64,
    pub subject: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.quiz + self.response + self.hint + self.subject
    }
}

/// Response cache over the shared key-value store.
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Free-text responses
    // ========================================================================

    pub async fn cached_response(&self, query: &str, age: u8, subject: &str) -> Option<String> {
        let key = response_key(query, age, subject);
        self.get_text(CacheCategory::Response, &key).await
    }

    pub async fn cache_response(&self, query: &str, age: u8, subject: &str, response: &str) {
        let key = response_key(query, age, subject);
        self.put_text(CacheCategory::Response, &key, response).await;
    }

    // ========================================================================
    // Quiz question sets
    // ========================================================================

    pub async fn cached_quiz(
        &self,
        topic: &str,
        subject: &str,
        count: u8,
        difficulty: &str,
    ) -> Option<Vec<Question>> {
        let key = quiz_key(topic, subject, count, difficulty);
        let json = self.get_text(CacheCategory::Quiz, &key).await?;
        self.decode(CacheCategory::Quiz, &key, &json)
    }

    pub async fn cache_quiz(
        &self,
        topic: &str,
        subject: &str,
        count: u8,
        difficulty: &str,
        questions: &[Question],
    ) {
        let key = quiz_key(topic, subject, count, difficulty);
        self.put_json(CacheCategory::Quiz, &key, questions).await;
    }

    /// Combined subject-detection + quiz result, stored under the quiz
    /// category (same TTL and invalidation scope, distinct fingerprint).
    pub async fn cached_quiz_with_subject(
        &self,
        query: &str,
        count: u8,
        difficulty: &str,
        age: u8,
    ) -> Option<QuizGenerationResult> {
        let key = quiz_with_subject_key(query, count, difficulty, age);
        let json = self.get_text(CacheCategory::Quiz, &key).await?;
        self.decode(CacheCategory::Quiz, &key, &json)
    }

    pub async fn cache_quiz_with_subject(
        &self,
        query: &str,
        count: u8,
        difficulty: &str,
        age: u8,
        result: &QuizGenerationResult,
    ) {
        let key = quiz_with_subject_key(query, count, difficulty, age);
        self.put_json(CacheCategory::Quiz, &key, result).await;
    }

    // ========================================================================
    // Hints
    // ========================================================================

    pub async fn cached_hint(&self, query: &str, subject: &str, age: u8) -> Option<String> {
        let key = hint_key(query, subject, age);
        self.get_text(CacheCategory::Hint, &key).await
    }

    pub async fn cache_hint(&self, query: &str, subject: &str, age: u8, hint: &str) {
        let key = hint_key(query, subject, age);
        self.put_text(CacheCategory::Hint, &key, hint).await;
    }

    // ========================================================================
    // Subject classifications
    // ========================================================================

    pub async fn cached_subject(&self, query: &str) -> Option<String> {
        let key = subject_key(query);
        self.get_text(CacheCategory::Subject, &key).await
    }

    pub async fn cache_subject(&self, query: &str, subject: &str) {
        let key = subject_key(query);
        self.put_text(CacheCategory::Subject, &key, subject).await;
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Delete every entry under a category. Used when generation logic
    /// changes and stale cached shapes must be discarded.
    pub async fn invalidate(&self, category: CacheCategory) {
        let keys = match self.store.keys_with_prefix(category.prefix()).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(category = %category, error = %e, "cache invalidation failed");
                return;
            }
        };
        let count = keys.len();
        for key in keys {
            if let Err(e) = self.store.delete(&key).await {
                warn!(key, error = %e, "cache delete failed");
            }
        }
        debug!(category = %category, count, "invalidated cache category");
    }

    /// Live entry counts per category. Store errors read as zero.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for category in CacheCategory::ALL {
            let count = match self.store.keys_with_prefix(category.prefix()).await {
                Ok(keys) => keys.len() as u64,
                Err(e) => {
                    warn!(category = %category, error = %e, "cache stats failed");
                    0
                }
            };
            match category {
                CacheCategory::Quiz => stats.quiz = count,
                CacheCategory::Response => stats.response = count,
                CacheCategory::Hint => stats.hint = count,
                CacheCategory::Subject => stats.subject = count,
            }
        }
        stats
    }

    // ========================================================================
    // Store plumbing (fail-open)
    // ========================================================================

    async fn get_text(&self, category: CacheCategory, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(value)) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "category" => category.label())
                    .increment(1);
                debug!(key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "category" => category.label())
                    .increment(1);
                None
            }
            Err(e) => {
                // Store outage degrades to a miss.
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "category" => category.label())
                    .increment(1);
                warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn put_text(&self, category: CacheCategory, key: &str, value: &str) {
        if let Err(e) = self.store.set_with_ttl(key, value, category.ttl()).await {
            warn!(key, error = %e, "cache write failed, skipping");
        }
    }

    async fn put_json<T: serde::Serialize + ?Sized>(&self, category: CacheCategory, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.put_text(category, key, &json).await,
            Err(e) => warn!(key, error = %e, "cache encode failed, skipping"),
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(
        &self,
        category: CacheCategory,
        key: &str,
        json: &str,
    ) -> Option<T> {
        match serde_json::from_str(json) {
            Ok(value) => Some(value),
            Err(e) => {
                // Stale shape from an older release; treat as a miss.
                warn!(category = %category, key, error = %e, "cache decode failed");
                None
            }
        }
    }
}

// ============================================================================
// Key derivation
// ============================================================================

/// Normalize text for fingerprinting: lowercase, trim, collapse internal
/// whitespace to single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Digest the operation-tagged parameter list into a namespaced key.
fn fingerprint(category: CacheCategory, op: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(op.as_bytes());
    for part in parts {
        hasher.update(b":");
        hasher.update(part.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("{}{}", category.prefix(), &digest[..16])
}

fn response_key(query: &str, age: u8, subject: &str) -> String {
    fingerprint(
        CacheCategory::Response,
        "response",
        &[&normalize(query), &age.to_string(), &normalize(subject)],
    )
}

fn quiz_key(topic: &str, subject: &str, count: u8, difficulty: &str) -> String {
    fingerprint(
        CacheCategory::Quiz,
        "quiz",
        &[
            &normalize(topic),
            &normalize(subject),
            &count.to_string(),
            &normalize(difficulty),
        ],
    )
}

fn quiz_with_subject_key(query: &str, count: u8, difficulty: &str, age: u8) -> String {
    fingerprint(
        CacheCategory::Quiz,
        "quiz_subject",
        &[
            &normalize(query),
            &count.to_string(),
            &normalize(difficulty),
            &age.to_string(),
        ],
    )
}

fn hint_key(query: &str, subject: &str, age: u8) -> String {
    fingerprint(
        CacheCategory::Hint,
        "hint",
        &[&normalize(query), &normalize(subject), &age.to_string()],
    )
}

fn subject_key(query: &str) -> String {
    fingerprint(CacheCategory::Subject, "subject", &[&normalize(query)])
}
