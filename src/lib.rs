//! TutorHive - Resilient AI content gateway for educational apps
//!
//! This crate orchestrates multiple upstream AI providers (Gemini, Groq,
//! OpenAI) behind one [`AiService`] facade. Requests flow through a
//! content-addressed response cache, per-provider retry with exponential
//! backoff, and a priority-ordered fallback chain, so a single flaky or
//! rate-limited vendor never takes the product down. A fixed-window
//! [`RateLimiter`] over the same shared store admits requests before any
//! provider work is spent.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tutorhive::{AiConfig, AiService, LimitCategory, MemoryStore, RateLimiter};
//!
//! #[tokio::main]
//! async fn main() -> tutorhive::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let mut config = AiConfig::default();
//!     config.gemini.enabled = true;
//!     config.gemini.api_key = Some("your-key".into());
//!
//!     let limiter = RateLimiter::new(store.clone());
//!     let service = AiService::from_config(&config, store)?;
//!
//!     limiter.check("student-42", LimitCategory::Chat).await?;
//!     let answer = service
//!         .generate_response("Why is the sky blue?", 9, "Science")
//!         .await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod providers;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheCategory, CacheStats, ResponseCache};
pub use config::{AiConfig, ProviderSettings};
pub use error::{Result, TutorHiveError};
pub use limiter::{LimitCategory, RateLimiter};
pub use providers::{
    AiProvider, GeminiProvider, GroqProvider, OpenAiProvider, RetryPolicy, RetryingProvider,
};
pub use service::{AiService, AiServiceBuilder};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use types::{ProviderStatus, Question, QuizGenerationResult};
