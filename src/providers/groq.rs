//! Groq provider.
//!
//! Groq serves open-weight models behind an OpenAI-compatible chat
//! completions API, so the wire types are shared with the OpenAI client.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::chat_wire::{ChatRequest, ChatResponse};
use super::traits::AiProvider;
use super::{classify_response, first_token, parse, prompts, transport_err};
use crate::config::ProviderSettings;
use crate::types::Question;
use crate::{Result, TutorHiveError};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

pub struct GroqProvider {
    settings: ArcSwap<ProviderSettings>,
    http: reqwest::Client,
}

impl GroqProvider {
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
            return Err(TutorHiveError::ProviderUnavailable("groq".to_string()));
        }
        let api_key = settings.api_key.as_deref().unwrap_or_default();
        let base = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let model = if settings.model.is_empty() {
            DEFAULT_MODEL
        } else {
            &settings.model
        };

        let request = ChatRequest::new(
            model,
            system,
            prompt,
            settings.temperature,
            settings.max_tokens,
        );

        debug!(model, "calling groq");
        let response = self
            .http
            .post(format!("{base}/chat/completions"))
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(transport_err)?;
        let response = classify_response(response).await?;

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| TutorHiveError::Parse(e.to_string()))?;
        payload.into_content()
    }
}

#[async_trait]
impl AiProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
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
