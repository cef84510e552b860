// src/metrics.rs
//! Prometheus recorder install and the `/metrics` route.

use std::time::Duration;

use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Must run before any counter
    /// or gauge is touched, or those series are lost. The cache TTL is
    /// exported as a static gauge so dashboards can annotate staleness.
    pub fn init(cache_ttl: Duration) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_gauge!(
            "events_cache_ttl_secs",
            "Configured freshness window for the event cache."
        );
        gauge!("events_cache_ttl_secs").set(cache_ttl.as_secs_f64());

        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
