use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::orchestrator::{display_events, Freshness, Orchestrator};
use crate::project::project_card;

/// Warning string attached to responses served from a stale cache, so the
/// page can show its cached-data notice.
pub const STALE_WARNING: &str = "Showing cached data due to an upstream error";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/events", get(events))
        .route("/api/cards", get(cards))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// `X-Cache` mirrors where the payload came from: HIT for a fresh cache
/// read, MISS for a live fetch, STALE for the fallback path.
fn cache_header(freshness: Freshness) -> &'static str {
    match freshness {
        Freshness::Live => "MISS",
        Freshness::Cached => "HIT",
        Freshness::Stale => "STALE",
    }
}

async fn events(State(state): State<AppState>) -> Response {
    match state.orchestrator.load_events().await {
        Ok(loaded) => {
            let upcoming = display_events(&loaded.events);
            let body = match loaded.freshness {
                Freshness::Stale => json!({ "events": upcoming, "warning": STALE_WARNING }),
                _ => json!(upcoming),
            };
            (
                [("X-Cache", cache_header(loaded.freshness))],
                Json(body),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": "Failed to load events", "details": e.to_string() })),
        )
            .into_response(),
    }
}

async fn cards(State(state): State<AppState>) -> Response {
    match state.orchestrator.load_events().await {
        Ok(loaded) => {
            let cards: Vec<_> = display_events(&loaded.events)
                .iter()
                .map(project_card)
                .collect();
            let body = match loaded.freshness {
                Freshness::Stale => json!({ "cards": cards, "warning": STALE_WARNING }),
                _ => json!(cards),
            };
            (
                [("X-Cache", cache_header(loaded.freshness))],
                Json(body),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": "Failed to load events", "details": e.to_string() })),
        )
            .into_response(),
    }
}
