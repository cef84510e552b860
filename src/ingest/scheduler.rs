// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;

use crate::orchestrator::Orchestrator;

/// Spawn a lightweight task that keeps the cache warm: re-fetch and rewrite
/// the slot on a fixed interval. The first tick fires immediately, so the
/// cache is primed at startup. Failures are logged and the cached payload is
/// left as-is.
pub fn spawn_refresh_task(orchestrator: Arc<Orchestrator>, interval: Duration) -> JoinHandle<()> {
    crate::ingest::ensure_metrics_described();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match orchestrator.fetch_and_cache().await {
                Ok(events) => {
                    counter!("ingest_runs_total").increment(1);
                    gauge!("ingest_last_refresh_ts")
                        .set(chrono::Utc::now().timestamp().max(0) as f64);
                    tracing::info!(
                        target: "ingest",
                        events = events.len(),
                        "scheduled refresh tick"
                    );
                }
                Err(e) => {
                    tracing::warn!(target: "ingest", error = %e, "scheduled refresh failed");
                }
            }
        }
    })
}
