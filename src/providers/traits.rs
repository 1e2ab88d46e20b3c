//! The provider capability trait.
//!
//! Each upstream AI vendor gets one concrete type implementing
//! [`AiProvider`]. Providers classify every failure at the point of
//! origin ([`TutorHiveError`] kinds), so the fallback orchestrator makes
//! retry/skip decisions without vendor-specific knowledge.
//!
//! # Availability
//!
//! `is_available()` is a pure configuration check (enabled flag +
//! credential presence), never a live upstream probe. It is consulted on
//! every orchestrated call and can change between calls via
//! configuration reload.
//!
//! [`TutorHiveError`]: crate::TutorHiveError

use async_trait::async_trait;

use crate::Result;
use crate::types::{Question, QuizGenerationResult};

/// One interchangeable upstream AI integration.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Human-readable provider name for logging/status.
    fn name(&self) -> &str;

    /// Whether the provider is enabled and has credentials. Cheap, no
    /// network call.
    fn is_available(&self) -> bool;

    /// Generate an educational free-text response for a query.
    async fn generate_response(&self, query: &str, age: u8, subject: &str) -> Result<String>;

    /// Generate multiple-choice quiz questions on a topic.
    async fn generate_questions(
        &self,
        topic: &str,
        subject: &str,
        count: u8,
        difficulty: &str,
        age: u8,
    ) -> Result<Vec<Question>>;

    /// Generate a hint that guides without revealing the answer.
    async fn generate_hint(&self, query: &str, subject: &str, age: u8) -> Result<String>;

    /// Classify a query into a single subject label.
    async fn classify_subject(&self, query: &str) -> Result<String>;

    /// Detect the subject and generate questions in one operation.
    ///
    /// Default implementation composes [`classify_subject`] and
    /// [`generate_questions`] as two upstream calls. Providers whose API
    /// can do both in a single call should override this.
    ///
    /// [`classify_subject`]: AiProvider::classify_subject
    /// [`generate_questions`]: AiProvider::generate_questions
    async fn generate_questions_with_subject(
        &self,
        query: &str,
        count: u8,
        difficulty: &str,
        age: u8,
    ) -> Result<QuizGenerationResult> {
        let subject = self.classify_subject(query).await?;
        let questions = self
            .generate_questions(query, &subject, count, difficulty, age)
            .await?;
        Ok(QuizGenerationResult {
            detected_subject: subject,
            questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TutorHiveError;

    /// Minimal provider exercising the default composite implementation.
    struct FixedProvider;

    #[async_trait]
    impl AiProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn generate_response(&self, _: &str, _: u8, _: &str) -> Result<String> {
            Err(TutorHiveError::EmptyResponse)
        }

        async fn generate_questions(
            &self,
            topic: &str,
            subject: &str,
            count: u8,
            _difficulty: &str,
            _age: u8,
        ) -> Result<Vec<Question>> {
            Ok((0..count)
                .map(|i| Question {
                    text: format!("{topic} ({subject}) #{i}"),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_option_index: 0,
                    explanation: String::new(),
                })
                .collect())
        }

        async fn generate_hint(&self, _: &str, _: &str, _: u8) -> Result<String> {
            Err(TutorHiveError::EmptyResponse)
        }

        async fn classify_subject(&self, _: &str) -> Result<String> {
            Ok("Math".to_string())
        }
    }

    #[tokio::test]
    async fn default_composite_delegates_to_both_capabilities() {
        let provider = FixedProvider;
        let result = provider
            .generate_questions_with_subject("what is 2+2?", 3, "easy", 9)
            .await
            .unwrap();

        assert_eq!(result.detected_subject, "Math");
        assert_eq!(result.questions.len(), 3);
        assert!(result.questions[0].text.contains("Math"));
    }
}
