//! Church Events Service binary entrypoint.
//! Boots the Axum HTTP server, wiring the event source, cache store,
//! orchestrator, and routes.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use church_events_service::ingest::providers::sheets::SheetsSource;
use church_events_service::ingest::scheduler::spawn_refresh_task;
use church_events_service::metrics::Metrics;
use church_events_service::{
    create_router, AppState, EventCache, FileStore, Orchestrator, ServiceConfig, EVENTS_CACHE_KEY,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("church_events_service=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = ServiceConfig::load_default()?;
    let metrics = Metrics::init(config.cache_ttl());

    let store = Arc::new(FileStore::new(&config.cache_dir));
    let cache = EventCache::new(store, EVENTS_CACHE_KEY, config.cache_ttl());
    let source = Arc::new(SheetsSource::from_url(
        &config.events_endpoint,
        &config.source_id,
    ));
    let orchestrator = Arc::new(
        Orchestrator::new(source, cache)
            .with_refresh_delay(Duration::from_secs(config.refresh_delay_secs)),
    );

    if config.refresh_interval_secs > 0 {
        spawn_refresh_task(
            Arc::clone(&orchestrator),
            Duration::from_secs(config.refresh_interval_secs),
        );
    }

    let router = create_router(AppState { orchestrator }).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "events service listening");
    axum::serve(listener, router).await?;

    Ok(())
}
