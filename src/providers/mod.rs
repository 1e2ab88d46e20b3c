//! Upstream AI provider integrations.
//!
//! Three concrete clients (Gemini, Groq, OpenAI) behind one
//! [`AiProvider`] trait, plus the retrying decorator the service wraps
//! them in. All clients classify HTTP failures the same way so the
//! retry/fallback layers stay vendor-agnostic.

use std::time::Duration;

use crate::{Result, TutorHiveError};

mod chat_wire;
mod parse;
mod prompts;

pub mod gemini;
pub mod groq;
pub mod openai;
pub mod retry;
pub mod traits;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use openai::OpenAiProvider;
pub use retry::{RetryPolicy, RetryingProvider};
pub use traits::AiProvider;

/// Classify a non-success HTTP response into an error kind.
///
/// 401/403 are permanent credential failures, 429 carries the vendor's
/// retry-after hint, remaining 4xx are request validation failures, and
/// everything else is an API error (5xx-class ones are retryable).
pub(crate) async fn classify_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 | 403 => Err(TutorHiveError::AuthenticationFailed),
        429 => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(TutorHiveError::RateLimited { retry_after })
        }
        400 | 404 | 422 => {
            let body = response.text().await.unwrap_or_default();
            Err(TutorHiveError::InvalidInput(truncate(&body, 200)))
        }
        code => {
            let body = response.text().await.unwrap_or_default();
            Err(TutorHiveError::Api {
                status: code,
                message: truncate(&body, 200),
            })
        }
    }
}

/// Map transport failures; timeouts and connection errors are retryable.
pub(crate) fn transport_err(e: reqwest::Error) -> TutorHiveError {
    TutorHiveError::Http(e.to_string())
}

/// Reduce a classification reply to its first whitespace-delimited
/// token, since models occasionally answer "Math." or "Math, because…".
pub(crate) fn first_token(reply: &str) -> Result<String> {
    reply
        .split_whitespace()
        .next()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| !t.is_empty())
        .ok_or(TutorHiveError::EmptyResponse)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_token_strips_punctuation_and_trailers() {
        assert_eq!(first_token("Math").unwrap(), "Math");
        assert_eq!(first_token("Math.").unwrap(), "Math");
        assert_eq!(first_token("Science, because plants").unwrap(), "Science");
        assert_eq!(first_token("  History \n").unwrap(), "History");
    }

    #[test]
    fn blank_classification_is_empty_response() {
        assert!(matches!(
            first_token("   "),
            Err(TutorHiveError::EmptyResponse)
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ααααα";
        let t = truncate(s, 3);
        assert!(t.starts_with('α'));
    }
}
