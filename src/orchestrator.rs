// src/orchestrator.rs
//! Load pipeline: cache → fetch → fallback.
//!
//! `load()` is the hard contract of this module: it never fails, and every
//! path ends in exactly one render call (fresh cache, live fetch, stale
//! cache with a visible flag, or the error view). Within one invocation the
//! cache read always happens before the fetch, a successful fetch before the
//! cache write, and the cache write before the render that depends on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::counter;

use crate::cache::EventCache;
use crate::event::Event;
use crate::filter::{filter_upcoming, sort_for_display};
use crate::ingest::types::{EventSource, IngestError};
use crate::project::{project_card, RenderCard};

/// Shown when neither the source nor the cache can produce events.
pub const FETCH_ERROR_MESSAGE: &str =
    "We're having trouble loading events right now. Please try again later.";

/// Where a rendered payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Fetched from the source during this load.
    Live,
    /// Served from cache within its TTL.
    Cached,
    /// Served from cache past its TTL, after a failed fetch.
    Stale,
}

/// View handed to the render target. Markup is the embedder's concern; a
/// `Stale` freshness must be surfaced to the reader as a cached-data notice.
#[derive(Debug, Clone, PartialEq)]
pub enum EventsView {
    Cards {
        cards: Vec<RenderCard>,
        freshness: Freshness,
    },
    /// Nothing upcoming; show the "check back soon" block.
    Empty,
    /// Nothing to show at all; show the retry/contact affordance.
    Error { message: String },
}

#[async_trait]
pub trait RenderTarget: Send + Sync {
    async fn render(&self, view: EventsView);
}

/// What a `load()` invocation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered { freshness: Freshness, shown: usize },
    Empty,
    Failed,
}

/// Payload plus provenance, for callers that render elsewhere (the HTTP
/// handlers).
#[derive(Debug, Clone)]
pub struct LoadedEvents {
    pub events: Vec<Event>,
    pub freshness: Freshness,
}

pub struct Orchestrator {
    source: Arc<dyn EventSource>,
    cache: EventCache,
    refresh_delay: Duration,
    refresh_in_flight: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn EventSource>, cache: EventCache) -> Self {
        crate::ingest::ensure_metrics_described();
        Self {
            source,
            cache,
            refresh_delay: Duration::from_secs(2),
            refresh_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// How long a fresh-cache load waits before refreshing in the background.
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Fetch from the source and overwrite the cache slot.
    pub async fn fetch_and_cache(&self) -> Result<Vec<Event>, IngestError> {
        let events = self.source.fetch_events().await?;
        self.cache.write(&events);
        Ok(events)
    }

    /// The load state machine minus rendering: fresh cache, else fetch, else
    /// stale cache. Errs only when all three come up empty.
    pub async fn load_events(&self) -> Result<LoadedEvents, IngestError> {
        if let Some(events) = self.cache.read(false) {
            counter!("events_cache_hits_total").increment(1);
            return Ok(LoadedEvents {
                events,
                freshness: Freshness::Cached,
            });
        }
        counter!("events_cache_misses_total").increment(1);

        match self.fetch_and_cache().await {
            Ok(events) => Ok(LoadedEvents {
                events,
                freshness: Freshness::Live,
            }),
            Err(e) => {
                if let Some(events) = self.cache.read(true) {
                    counter!("events_cache_stale_total").increment(1);
                    tracing::warn!(
                        error = %e,
                        source = self.source.name(),
                        "fetch failed, serving stale cache"
                    );
                    return Ok(LoadedEvents {
                        events,
                        freshness: Freshness::Stale,
                    });
                }
                Err(e)
            }
        }
    }

    /// Full load: drives the render target and cannot fail. A fresh cache
    /// hit renders immediately, then refreshes in the background after a
    /// short delay so the displayed data catches up without blocking the
    /// reader.
    pub async fn load(&self, target: Arc<dyn RenderTarget>) -> LoadOutcome {
        if let Some(events) = self.cache.read(false) {
            counter!("events_cache_hits_total").increment(1);
            let outcome = render_events(&*target, &events, Freshness::Cached).await;
            self.spawn_background_refresh(target);
            return outcome;
        }
        counter!("events_cache_misses_total").increment(1);

        match self.fetch_and_cache().await {
            Ok(events) => render_events(&*target, &events, Freshness::Live).await,
            Err(e) => {
                tracing::warn!(error = %e, source = self.source.name(), "event fetch failed");
                match self.cache.read(true) {
                    Some(events) => {
                        counter!("events_cache_stale_total").increment(1);
                        render_events(&*target, &events, Freshness::Stale).await
                    }
                    None => {
                        target
                            .render(EventsView::Error {
                                message: FETCH_ERROR_MESSAGE.to_string(),
                            })
                            .await;
                        LoadOutcome::Failed
                    }
                }
            }
        }
    }

    /// At most one refresh is pending at a time; overlapping loads reuse it.
    fn spawn_background_refresh(&self, target: Arc<dyn RenderTarget>) {
        if self.refresh_in_flight.swap(true, Ordering::SeqCst) {
            return;
        }
        let source = Arc::clone(&self.source);
        let cache = self.cache.clone();
        let delay = self.refresh_delay;
        let in_flight = Arc::clone(&self.refresh_in_flight);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match source.fetch_events().await {
                Ok(events) => {
                    cache.write(&events);
                    render_events(&*target, &events, Freshness::Live).await;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "background refresh failed, keeping cached payload");
                }
            }
            in_flight.store(false, Ordering::SeqCst);
        });
    }
}

/// Upcoming events in display order, relative to the local calendar date.
pub fn display_events(events: &[Event]) -> Vec<Event> {
    let mut upcoming = filter_upcoming(events, today_local());
    sort_for_display(&mut upcoming);
    upcoming
}

async fn render_events(
    target: &dyn RenderTarget,
    events: &[Event],
    freshness: Freshness,
) -> LoadOutcome {
    let upcoming = display_events(events);
    if upcoming.is_empty() {
        target.render(EventsView::Empty).await;
        return LoadOutcome::Empty;
    }
    let cards: Vec<RenderCard> = upcoming.iter().map(project_card).collect();
    let shown = cards.len();
    target.render(EventsView::Cards { cards, freshness }).await;
    LoadOutcome::Rendered { freshness, shown }
}

fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// --- Test helper ---
/// Records every view it is asked to render, in order.
#[derive(Default)]
pub struct RecordingTarget {
    pub views: std::sync::Mutex<Vec<EventsView>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<EventsView> {
        self.views.lock().expect("recording mutex poisoned").clone()
    }
}

#[async_trait]
impl RenderTarget for RecordingTarget {
    async fn render(&self, view: EventsView) {
        self.views
            .lock()
            .expect("recording mutex poisoned")
            .push(view);
    }
}
