//! The AI service facade: fallback orchestration over registered
//! providers, with the response cache consulted first.
//!
//! Providers are tried in the configured priority order. Unavailable
//! providers are skipped without a network call; any classified failure
//! (after the provider's own retries) moves the chain to the next
//! provider. Only when every provider has been skipped or has failed
//! does the facade return [`AllProvidersFailed`] carrying the last
//! underlying error.
//!
//! Rate limiting is deliberately not part of this facade: callers admit
//! requests through [`RateLimiter`](crate::RateLimiter) before invoking
//! an operation, so a rejected request never spends cache or provider
//! work.
//!
//! # Flow
//!
//! ```text
//! generate_questions(topic, …)
//!         │
//!         ▼
//!   ResponseCache ──hit──► return cached questions
//!         │ miss
//!         ▼
//!   gemini (priority 0) ──unavailable──► skip
//!         │
//!         ▼
//!   groq (priority 1) ──retries exhausted──► next
//!         │
//!         ▼
//!   openai (priority 2) ──ok──► cache + return
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheCategory, CacheStats, ResponseCache};
use crate::config::AiConfig;
use crate::providers::{
    AiProvider, GeminiProvider, GroqProvider, OpenAiProvider, RetryPolicy, RetryingProvider,
};
use crate::store::KeyValueStore;
use crate::telemetry;
use crate::types::{ProviderStatus, Question, QuizGenerationResult};
use crate::{Result, TutorHiveError};

/// Fallback-orchestrating facade over the registered providers.
pub struct AiService {
    providers: HashMap<String, Arc<dyn AiProvider>>,
    priority: Vec<String>,
    cache: ResponseCache,
}

impl AiService {
    /// Start building a service.
    pub fn builder() -> AiServiceBuilder {
        AiServiceBuilder::default()
    }

    /// Build a service with the three stock providers from configuration.
    pub fn from_config(config: &AiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Self::builder()
            .provider("gemini", Arc::new(GeminiProvider::new(config.gemini.clone())))
            .provider("groq", Arc::new(GroqProvider::new(config.groq.clone())))
            .provider("openai", Arc::new(OpenAiProvider::new(config.openai.clone())))
            .priority(config.provider_priority.clone())
            .store(store)
            .build()
    }

    // ========================================================================
    // Generation operations
    // ========================================================================

    /// Generate an educational response, serving repeats from cache.
    #[instrument(skip(self, query), fields(operation = "generate_response"))]
    pub async fn generate_response(&self, query: &str, age: u8, subject: &str) -> Result<String> {
        if let Some(hit) = self.cache.cached_response(query, age, subject).await {
            return Ok(hit);
        }

        let start = Instant::now();
        let mut last_err = None;
        for provider in self.chain() {
            match provider.generate_response(query, age, subject).await {
                Ok(response) => {
                    Self::record_request("generate_response", provider.name(), start, true);
                    self.cache
                        .cache_response(query, age, subject, &response)
                        .await;
                    return Ok(response);
                }
                Err(e) => {
                    Self::record_request("generate_response", provider.name(), start, false);
                    warn!(provider = provider.name(), error = %e, "provider failed, falling back");
                    last_err = Some(e);
                }
            }
        }
        Self::record_request("generate_response", "none", start, false);
        Err(Self::exhausted("generate_response", last_err))
    }

    /// Generate quiz questions, serving repeats from cache.
    #[instrument(skip(self, topic), fields(operation = "generate_questions"))]
    pub async fn generate_questions(
        &self,
        topic: &str,
        subject: &str,
        count: u8,
        difficulty: &str,
        age: u8,
    ) -> Result<Vec<Question>> {
        if let Some(hit) = self.cache.cached_quiz(topic, subject, count, difficulty).await {
            return Ok(hit);
        }

        let start = Instant::now();
        let mut last_err = None;
        for provider in self.chain() {
            match provider
                .generate_questions(topic, subject, count, difficulty, age)
                .await
            {
                Ok(questions) => {
                    Self::record_request("generate_questions", provider.name(), start, true);
                    self.cache
                        .cache_quiz(topic, subject, count, difficulty, &questions)
                        .await;
                    return Ok(questions);
                }
                Err(e) => {
                    Self::record_request("generate_questions", provider.name(), start, false);
                    warn!(provider = provider.name(), error = %e, "provider failed, falling back");
                    last_err = Some(e);
                }
            }
        }
        Self::record_request("generate_questions", "none", start, false);
        Err(Self::exhausted("generate_questions", last_err))
    }

    /// Detect the subject and generate questions in one operation.
    #[instrument(skip(self, query), fields(operation = "generate_questions_with_subject"))]
    pub async fn generate_questions_with_subject(
        &self,
        query: &str,
        count: u8,
        difficulty: &str,
        age: u8,
    ) -> Result<QuizGenerationResult> {
        if let Some(hit) = self
            .cache
            .cached_quiz_with_subject(query, count, difficulty, age)
            .await
        {
            return Ok(hit);
        }

        let start = Instant::now();
        let mut last_err = None;
        for provider in self.chain() {
            match provider
                .generate_questions_with_subject(query, count, difficulty, age)
                .await
            {
                Ok(result) => {
                    Self::record_request(
                        "generate_questions_with_subject",
                        provider.name(),
                        start,
                        true,
                    );
                    self.cache
                        .cache_quiz_with_subject(query, count, difficulty, age, &result)
                        .await;
                    return Ok(result);
                }
                Err(e) => {
                    Self::record_request(
                        "generate_questions_with_subject",
                        provider.name(),
                        start,
                        false,
                    );
                    warn!(provider = provider.name(), error = %e, "provider failed, falling back");
                    last_err = Some(e);
                }
            }
        }
        Self::record_request("generate_questions_with_subject", "none", start, false);
        Err(Self::exhausted("generate_questions_with_subject", last_err))
    }

    /// Generate a hint, serving repeats from cache.
    #[instrument(skip(self, query), fields(operation = "generate_hint"))]
    pub async fn generate_hint(&self, query: &str, subject: &str, age: u8) -> Result<String> {
        if let Some(hit) = self.cache.cached_hint(query, subject, age).await {
            return Ok(hit);
        }

        let start = Instant::now();
        let mut last_err = None;
        for provider in self.chain() {
            match provider.generate_hint(query, subject, age).await {
                Ok(hint) => {
                    Self::record_request("generate_hint", provider.name(), start, true);
                    self.cache.cache_hint(query, subject, age, &hint).await;
                    return Ok(hint);
                }
                Err(e) => {
                    Self::record_request("generate_hint", provider.name(), start, false);
                    warn!(provider = provider.name(), error = %e, "provider failed, falling back");
                    last_err = Some(e);
                }
            }
        }
        Self::record_request("generate_hint", "none", start, false);
        Err(Self::exhausted("generate_hint", last_err))
    }

    /// Classify a query into a subject label, serving repeats from cache.
    #[instrument(skip(self, query), fields(operation = "classify_subject"))]
    pub async fn classify_subject(&self, query: &str) -> Result<String> {
        if let Some(hit) = self.cache.cached_subject(query).await {
            return Ok(hit);
        }

        let start = Instant::now();
        let mut last_err = None;
        for provider in self.chain() {
            match provider.classify_subject(query).await {
                Ok(subject) => {
                    Self::record_request("classify_subject", provider.name(), start, true);
                    self.cache.cache_subject(query, &subject).await;
                    return Ok(subject);
                }
                Err(e) => {
                    Self::record_request("classify_subject", provider.name(), start, false);
                    warn!(provider = provider.name(), error = %e, "provider failed, falling back");
                    last_err = Some(e);
                }
            }
        }
        Self::record_request("classify_subject", "none", start, false);
        Err(Self::exhausted("classify_subject", last_err))
    }

    // ========================================================================
    // Introspection and maintenance
    // ========================================================================

    /// Availability of every registered provider, keyed by registry key.
    pub fn provider_status(&self) -> HashMap<String, ProviderStatus> {
        self.providers
            .iter()
            .map(|(key, provider)| {
                (
                    key.clone(),
                    ProviderStatus {
                        name: provider.name().to_string(),
                        available: provider.is_available(),
                    },
                )
            })
            .collect()
    }

    /// Smoke-test one provider with a trivial classification.
    ///
    /// Returns `false` for unknown keys and for any call failure; the
    /// failure is logged, not propagated.
    pub async fn test_provider(&self, key: &str) -> bool {
        let Some(provider) = self.providers.get(key) else {
            warn!(key, "test requested for unknown provider");
            return false;
        };
        match provider.classify_subject("What is 2+2?").await {
            Ok(subject) => {
                info!(key, subject, "provider test succeeded");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "provider test failed");
                false
            }
        }
    }

    /// Delete all cached entries in a category.
    pub async fn invalidate_cache(&self, category: CacheCategory) {
        self.cache.invalidate(category).await;
    }

    /// Live cache entry counts.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Providers in priority order, skipping unknown keys and providers
    /// that are currently unavailable.
    fn chain(&self) -> impl Iterator<Item = &Arc<dyn AiProvider>> {
        self.priority.iter().filter_map(|key| {
            let Some(provider) = self.providers.get(key) else {
                warn!(key, "priority list names an unregistered provider");
                return None;
            };
            if !provider.is_available() {
                debug!(provider = provider.name(), "skipping unavailable provider");
                return None;
            }
            Some(provider)
        })
    }

    fn exhausted(operation: &str, last_err: Option<TutorHiveError>) -> TutorHiveError {
        TutorHiveError::AllProvidersFailed {
            operation: operation.to_string(),
            last: Box::new(last_err.unwrap_or(TutorHiveError::NoProvider)),
        }
    }

    fn record_request(operation: &'static str, provider: &str, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        let elapsed = start.elapsed().as_secs_f64();
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => provider.to_owned(),
            "operation" => operation,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => provider.to_owned(),
            "operation" => operation,
        )
        .record(elapsed);
    }
}

/// Builder for [`AiService`].
///
/// Providers are wrapped in [`RetryingProvider`] at build time, so each
/// one exhausts its own retry budget before the fallback chain sees a
/// failure.
#[derive(Default)]
pub struct AiServiceBuilder {
    providers: Vec<(String, Arc<dyn AiProvider>)>,
    priority: Option<Vec<String>>,
    store: Option<Arc<dyn KeyValueStore>>,
    retry: Option<RetryPolicy>,
}

impl AiServiceBuilder {
    /// Register a provider under a registry key.
    pub fn provider(mut self, key: impl Into<String>, provider: Arc<dyn AiProvider>) -> Self {
        self.providers.push((key.into(), provider));
        self
    }

    /// Set the fallback order. Defaults to registration order.
    pub fn priority(mut self, priority: Vec<String>) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the shared store backing the response cache.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the per-provider retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn build(self) -> Result<AiService> {
        if self.providers.is_empty() {
            return Err(TutorHiveError::NoProvider);
        }
        let store = self
            .store
            .ok_or_else(|| TutorHiveError::Configuration("no store configured".to_string()))?;
        let retry = self.retry.unwrap_or_default();

        let priority = self.priority.unwrap_or_else(|| {
            self.providers.iter().map(|(key, _)| key.clone()).collect()
        });

        let providers = self
            .providers
            .into_iter()
            .map(|(key, provider)| {
                let wrapped: Arc<dyn AiProvider> =
                    Arc::new(RetryingProvider::new(provider, retry.clone()));
                (key, wrapped)
            })
            .collect();

        Ok(AiService {
            providers,
            priority,
            cache: ResponseCache::new(store),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn build_without_providers_fails() {
        let result = AiService::builder()
            .store(Arc::new(MemoryStore::new()))
            .build();
        assert!(matches!(result, Err(TutorHiveError::NoProvider)));
    }

    #[test]
    fn build_without_store_fails() {
        let result = AiService::builder()
            .provider(
                "gemini",
                Arc::new(GeminiProvider::new(Default::default())),
            )
            .build();
        assert!(matches!(result, Err(TutorHiveError::Configuration(_))));
    }

    #[test]
    fn from_config_registers_all_stock_providers() {
        let service =
            AiService::from_config(&AiConfig::default(), Arc::new(MemoryStore::new())).unwrap();
        let status = service.provider_status();
        assert_eq!(status.len(), 3);
        assert!(!status["gemini"].available);
        assert!(!status["groq"].available);
        assert!(!status["openai"].available);
    }
}
