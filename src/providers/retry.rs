//! Retry policy, delay calculation, and the retrying provider decorator.
//!
//! Provides [`RetryPolicy`] for controlling retry behaviour and
//! [`RetryingProvider`], which wraps any [`AiProvider`] with automatic
//! retry on transient errors. All wrapped operations delegate to the
//! shared `with_retry()` helper, keeping retry logic in a single place.
//!
//! Rate-limit errors are never retried here: retrying into a quota wall
//! wastes the whole backoff budget, so they surface immediately and the
//! fallback orchestrator moves to the next provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::traits::AiProvider;
use crate::telemetry;
use crate::types::{Question, QuizGenerationResult};
use crate::{Result, TutorHiveError};

/// Retry behaviour for transient provider errors.
///
/// Exponential backoff: `initial_delay * 2^attempt`, capped at
/// `max_delay`.
///
/// ```rust
/// # use tutorhive::RetryPolicy;
/// # use std::time::Duration;
/// let policy = RetryPolicy::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 500ms.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth).
    /// Default: 10s.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the defaults above.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before the retry following `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

/// Execute an async operation with retry logic.
///
/// Retries on transient errors (as classified by
/// [`TutorHiveError::is_retryable()`]) up to `policy.max_attempts`,
/// sleeping the backoff delay between attempts. Rate-limit and permanent
/// errors are returned immediately without retry; on exhaustion the last
/// error is propagated.
pub(crate) async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    provider_name: &str,
    operation: &str,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..policy.max_attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() => {
                metrics::counter!(telemetry::RETRIES_TOTAL,
                    "provider" => provider_name.to_owned(),
                    "operation" => operation.to_owned(),
                )
                .increment(1);
                if attempt + 1 < policy.max_attempts {
                    let delay = policy.delay_for_attempt(attempt);
                    warn!(
                        provider = provider_name,
                        operation,
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            // Rate limits and permanent errors go straight back to the
            // fallback orchestrator.
            Err(e) => return Err(e),
        }
    }
    match last_err {
        Some(e) => {
            warn!(
                provider = provider_name,
                operation,
                attempts = policy.max_attempts,
                error = %e,
                "retries exhausted"
            );
            Err(e)
        }
        None => Err(TutorHiveError::NoProvider),
    }
}

/// Decorator that wraps an [`AiProvider`] with retry logic.
///
/// `name()` and `is_available()` delegate unchanged, so the fallback
/// orchestrator sees the wrapped provider's identity.
pub struct RetryingProvider {
    inner: Arc<dyn AiProvider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    /// Wrap a provider with retry logic.
    pub fn new(inner: Arc<dyn AiProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl AiProvider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    async fn generate_response(&self, query: &str, age: u8, subject: &str) -> Result<String> {
        with_retry(&self.policy, self.inner.name(), "generate_response", || {
            self.inner.generate_response(query, age, subject)
        })
        .await
    }

    async fn generate_questions(
        &self,
        topic: &str,
        subject: &str,
        count: u8,
        difficulty: &str,
        age: u8,
    ) -> Result<Vec<Question>> {
        with_retry(&self.policy, self.inner.name(), "generate_questions", || {
            self.inner
                .generate_questions(topic, subject, count, difficulty, age)
        })
        .await
    }

    async fn generate_hint(&self, query: &str, subject: &str, age: u8) -> Result<String> {
        with_retry(&self.policy, self.inner.name(), "generate_hint", || {
            self.inner.generate_hint(query, subject, age)
        })
        .await
    }

    async fn classify_subject(&self, query: &str) -> Result<String> {
        with_retry(&self.policy, self.inner.name(), "classify_subject", || {
            self.inner.classify_subject(query)
        })
        .await
    }

    async fn generate_questions_with_subject(
        &self,
        query: &str,
        count: u8,
        difficulty: &str,
        age: u8,
    ) -> Result<QuizGenerationResult> {
        // Delegate to the inner provider so single-call overrides are
        // preserved; the whole composite is the retry unit.
        with_retry(
            &self.policy,
            self.inner.name(),
            "generate_questions_with_subject",
            || {
                self.inner
                    .generate_questions_with_subject(query, count, difficulty, age)
            },
        )
        .await
    }
}
