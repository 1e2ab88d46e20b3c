//! Canonical data shapes shared across providers and the facade.
//!
//! Every provider maps its vendor-specific payload into these types, so
//! the orchestrator and callers never see wire formats.

use serde::{Deserialize, Serialize};

/// A single multiple-choice quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    pub text: String,
    /// Answer options. Providers are prompted for exactly four.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_option_index: usize,
    /// Explanation shown after answering.
    pub explanation: String,
}

/// Result of the combined subject-detection + question-generation
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizGenerationResult {
    /// Subject label the provider detected for the query.
    pub detected_subject: String,
    /// Generated questions.
    pub questions: Vec<Question>,
}

/// Availability snapshot for one registered provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStatus {
    /// Human-readable provider name (e.g. "Gemini").
    pub name: String,
    /// Whether the provider is enabled and has credentials.
    pub available: bool,
}
