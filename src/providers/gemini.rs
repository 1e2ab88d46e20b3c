//! Google Gemini provider.
//!
//! Gemini authenticates with the API key as a query parameter rather
//! than a bearer header, and uses its own request/response shape; text
//! comes back at `candidates[0].content.parts[0].text`.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::traits::AiProvider;
use super::{classify_response, first_token, parse, prompts, transport_err};
use crate::config::ProviderSettings;
use crate::types::Question;
use crate::{Result, TutorHiveError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiProvider {
    settings: ArcSwap<ProviderSettings>,
    http: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self::with_http_client(settings, reqwest::Client::new())
    }

    pub fn with_http_client(settings: ProviderSettings, http: reqwest::Client) -> Self {
        Self {
            settings: ArcSwap::from_pointee(settings),
            http,
        }
    }

    /// Swap in new settings; visible to the next call without locking.
    pub fn reload(&self, settings: ProviderSettings) {
        self.settings.store(Arc::new(settings));
    }

    async fn complete(&self, system: &str, prompt: String) -> Result<String> {
        let settings = self.settings.load_full();
        if !settings.is_configured() {
            return Err(TutorHiveError::ProviderUnavailable("gemini".to_string()));
        }
        let api_key = settings.api_key.as_deref().unwrap_or_default();
        let base = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let model = if settings.model.is_empty() {
            DEFAULT_MODEL
        } else {
            &settings.model
        };
        let url = format!("{base}/models/{model}:generateContent");

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{system}\n\n{prompt}"),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_tokens,
            },
        };

        debug!(model, "calling gemini");
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .timeout(Duration::from_secs(settings.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(transport_err)?;
        let response = classify_response(response).await?;

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TutorHiveError::Parse(e.to_string()))?;
        payload.into_text()
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.settings.load().is_configured()
    }

    async fn generate_response(&self, query: &str, age: u8, subject: &str) -> Result<String> {
        self.complete(prompts::EDUCATOR, prompts::educational(query, age, subject))
            .await
    }

    async fn generate_questions(
        &self,
        topic: &str,
        subject: &str,
        count: u8,
        difficulty: &str,
        _age: u8,
    ) -> Result<Vec<Question>> {
        let raw = self
            .complete(
                prompts::QUIZ_GENERATOR,
                prompts::quiz(topic, subject, count, difficulty),
            )
            .await?;
        parse::parse_questions(&raw)
    }

    async fn generate_hint(&self, query: &str, subject: &str, age: u8) -> Result<String> {
        self.complete(prompts::HINT_PROVIDER, prompts::hint(query, subject, age))
            .await
    }

    async fn classify_subject(&self, query: &str) -> Result<String> {
        let raw = self
            .complete(prompts::CLASSIFIER, prompts::subject(query))
            .await?;
        first_token(&raw)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(TutorHiveError::EmptyResponse);
        }
        Ok(text)
    }
}
