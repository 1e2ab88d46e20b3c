//! Telemetry metric name constants.
//!
//! Centralised metric names for tutorhive operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `tutorhive_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` — provider key (e.g. "gemini", "groq", "openai")
//! - `operation` — facade operation (e.g. "generate_response")
//! - `status` — outcome: "ok" or "error"
//! - `category` — cache or rate-limit category

/// Total requests dispatched through the fallback orchestrator.
///
/// Labels: `provider`, `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "tutorhive_requests_total";

/// Request duration in seconds, cache misses only.
///
/// Labels: `provider`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "tutorhive_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`, `operation`.
pub const RETRIES_TOTAL: &str = "tutorhive_retries_total";

/// Total cache hits.
///
/// Labels: `category`.
pub const CACHE_HITS_TOTAL: &str = "tutorhive_cache_hits_total";

/// Total cache misses.
///
/// Labels: `category`.
pub const CACHE_MISSES_TOTAL: &str = "tutorhive_cache_misses_total";

/// Total requests rejected by the rate limiter.
///
/// Labels: `category`.
pub const RATE_LIMIT_REJECTIONS_TOTAL: &str = "tutorhive_rate_limit_rejections_total";
