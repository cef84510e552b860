// tests/api_http.rs
//! In-process router tests: response shapes and `X-Cache` diagnostics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

use church_events_service::cache::{EventCache, MemoryStore};
use church_events_service::event::Event;
use church_events_service::ingest::providers::sheets::SheetsSource;
use church_events_service::ingest::types::{EventSource, IngestError};
use church_events_service::orchestrator::Orchestrator;
use church_events_service::{create_router, AppState};

const SHEET_BODY: &str = include_str!("fixtures/sheet_rows.json");

/// Succeeds on the first fetch, fails on every later one.
struct FlakySource {
    calls: AtomicUsize,
}

#[async_trait]
impl EventSource for FlakySource {
    async fn fetch_events(&self) -> Result<Vec<Event>, IngestError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            SheetsSource::from_fixture(SHEET_BODY).fetch_events().await
        } else {
            Err(IngestError::Status {
                status: 502,
                message: "upstream error".to_string(),
            })
        }
    }
    fn name(&self) -> &'static str {
        "flaky"
    }
}

struct AlwaysFailingSource;

#[async_trait]
impl EventSource for AlwaysFailingSource {
    async fn fetch_events(&self) -> Result<Vec<Event>, IngestError> {
        Err(IngestError::Shape("not an array".to_string()))
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

fn app_with(source: Arc<dyn EventSource>, cache: EventCache) -> Router {
    let orchestrator = Arc::new(Orchestrator::new(source, cache));
    create_router(AppState { orchestrator })
}

fn memory_cache(ttl: Duration) -> EventCache {
    EventCache::new(Arc::new(MemoryStore::new()), "slot", ttl)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("router response");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn x_cache(headers: &HeaderMap) -> &str {
    headers
        .get("X-Cache")
        .expect("X-Cache header must be present")
        .to_str()
        .expect("X-Cache header must be valid ASCII")
}

#[tokio::test]
async fn health_is_ok() {
    let app = app_with(
        Arc::new(SheetsSource::from_fixture(SHEET_BODY)),
        memory_cache(Duration::from_secs(60)),
    );
    let (status, _, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn events_miss_then_hit() {
    let app = app_with(
        Arc::new(SheetsSource::from_fixture(SHEET_BODY)),
        memory_cache(Duration::from_secs(60)),
    );

    let (status, headers, body) = get(&app, "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(x_cache(&headers), "MISS");

    // Past and dateless rows are gone; display order is by start date.
    let events = body.as_array().expect("array body");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Youth Retreat");
    assert_eq!(events[1]["title"], "Night of Worship");

    let (status, headers, _) = get(&app, "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(x_cache(&headers), "HIT");
}

#[tokio::test]
async fn expired_cache_with_broken_source_serves_stale_with_warning() {
    let ttl = Duration::from_secs(60);
    let now = Arc::new(AtomicU64::new(0));
    let clock_now = Arc::clone(&now);
    let cache = memory_cache(ttl).with_clock(move || clock_now.load(Ordering::SeqCst));

    let app = app_with(
        Arc::new(FlakySource {
            calls: AtomicUsize::new(0),
        }),
        cache,
    );

    let (_, headers, _) = get(&app, "/api/events").await;
    assert_eq!(x_cache(&headers), "MISS");

    now.store(ttl.as_millis() as u64 + 1, Ordering::SeqCst);

    let (status, headers, body) = get(&app, "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(x_cache(&headers), "STALE");
    assert!(body["warning"].as_str().unwrap().contains("cached data"));
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn total_failure_is_a_friendly_502() {
    let app = app_with(
        Arc::new(AlwaysFailingSource),
        memory_cache(Duration::from_secs(60)),
    );
    let (status, _, body) = get(&app, "/api/events").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to load events");
    assert!(body["details"].as_str().unwrap().contains("shape"));
}

#[tokio::test]
async fn cards_are_projected_with_labels() {
    let app = app_with(
        Arc::new(SheetsSource::from_fixture(SHEET_BODY)),
        memory_cache(Duration::from_secs(60)),
    );
    let (status, headers, body) = get(&app, "/api/cards").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(x_cache(&headers), "MISS");

    let cards = body.as_array().expect("array body");
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["title"], "Youth Retreat");
    assert_eq!(cards[0]["actionLabel"], "View Image");
    assert_eq!(cards[0]["timeLabel"], "All Day");
    assert_eq!(cards[1]["actionLabel"], "Watch Video");
    assert_eq!(
        cards[1]["mediaUrl"],
        "https://www.youtube.com/embed/dQw4w9WgXcQ"
    );
}
