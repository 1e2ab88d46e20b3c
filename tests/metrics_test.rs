//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use tutorhive::providers::traits::AiProvider;
use tutorhive::store::MemoryStore;
use tutorhive::{AiService, Question, Result, TutorHiveError, telemetry};

// ============================================================================
// Mock providers
// ============================================================================

struct MockProvider {
    calls: AtomicU32,
}

impl MockProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn generate_response(&self, _query: &str, _age: u8, _subject: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok("answer".to_string())
    }

    async fn generate_questions(
        &self,
        _topic: &str,
        _subject: &str,
        _count: u8,
        _difficulty: &str,
        _age: u8,
    ) -> Result<Vec<Question>> {
        Err(TutorHiveError::EmptyResponse)
    }

    async fn generate_hint(&self, _query: &str, _subject: &str, _age: u8) -> Result<String> {
        Err(TutorHiveError::AuthenticationFailed)
    }

    async fn classify_subject(&self, _query: &str) -> Result<String> {
        Ok("Math".to_string())
    }
}

fn service(provider: Arc<MockProvider>) -> AiService {
    AiService::builder()
        .provider("mock", provider as Arc<dyn AiProvider>)
        .store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap()
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn successful_request_records_request_and_cache_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let service = service(MockProvider::new());
                // Miss then hit.
                service.generate_response("why?", 9, "Science").await?;
                service.generate_response("why?", 9, "Science").await
            })
        })
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL),
        1,
        "only the cache miss dispatches a request"
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert!(
        has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn retried_request_records_retry_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let _result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let service = AiService::builder()
                    .provider("mock", MockProvider::new() as Arc<dyn AiProvider>)
                    .store(Arc::new(MemoryStore::new()))
                    .retry_policy(
                        tutorhive::RetryPolicy::new()
                            .max_attempts(3)
                            .initial_delay(std::time::Duration::from_millis(1)),
                    )
                    .build()
                    .unwrap();
                // EmptyResponse is transient, so all attempts are spent.
                service.generate_questions("sums", "Math", 1, "easy", 9).await
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::RETRIES_TOTAL), 3);
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let service = service(MockProvider::new());
    let answer = service.generate_response("why?", 9, "Science").await.unwrap();
    assert_eq!(answer, "answer");
}
