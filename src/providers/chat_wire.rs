//! Wire types for OpenAI-compatible chat completion APIs.
//!
//! Groq exposes the same request/response shape as OpenAI, so both
//! clients share these types and the content extraction path
//! (`choices[0].message.content`).

use serde::{Deserialize, Serialize};

use crate::{Result, TutorHiveError};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatRequest {
    pub fn new(
        model: &str,
        system: &str,
        user: String,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Pull the first choice's content; a missing or blank message is an
    /// empty response.
    pub fn into_content(self) -> Result<String> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(TutorHiveError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_content().unwrap(), "hello");
    }

    #[test]
    fn empty_choices_is_empty_response() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            parsed.into_content(),
            Err(TutorHiveError::EmptyResponse)
        ));
    }

    #[test]
    fn blank_content_is_empty_response() {
        let raw = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            parsed.into_content(),
            Err(TutorHiveError::EmptyResponse)
        ));
    }
}
