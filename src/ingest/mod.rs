// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::event::Event;
use crate::ingest::types::RowTable;
use crate::normalize::{normalize_row, ColumnMap};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_rows_total", "Data rows seen in fetched tables.");
        describe_counter!(
            "ingest_events_kept_total",
            "Events kept after row normalization."
        );
        describe_counter!(
            "ingest_rows_skipped_total",
            "Rows skipped for a missing or unparseable date."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Source fetch/parse errors."
        );
        describe_counter!(
            "ingest_runs_total",
            "Completed scheduled refresh runs."
        );
        describe_counter!("events_cache_hits_total", "Fresh cache reads served.");
        describe_counter!("events_cache_misses_total", "Cache misses that triggered a fetch.");
        describe_counter!(
            "events_cache_stale_total",
            "Stale cache payloads served after a failed fetch."
        );
        describe_histogram!("ingest_parse_ms", "Source body parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_refresh_ts",
            "Unix ts of the last scheduled refresh."
        );
    });
}

/// Normalize a raw table into events.
///
/// Column positions are re-derived from the actual header row on every call,
/// so a reordered or partially-present sheet keeps working. Rows without a
/// usable date are counted and skipped, never an error.
pub fn normalize_table(table: &RowTable) -> Vec<Event> {
    ensure_metrics_described();

    if table.values.len() < 2 {
        return Vec::new();
    }
    let columns = ColumnMap::resolve(&table.values[0]);

    let mut kept = Vec::with_capacity(table.values.len() - 1);
    let mut skipped = 0usize;
    for row in &table.values[1..] {
        match normalize_row(row, &columns) {
            Some(ev) => kept.push(ev),
            None => skipped += 1,
        }
    }

    counter!("ingest_rows_total").increment((table.values.len() - 1) as u64);
    counter!("ingest_events_kept_total").increment(kept.len() as u64);
    counter!("ingest_rows_skipped_total").increment(skipped as u64);
    if skipped > 0 {
        tracing::debug!(skipped, "rows skipped during normalization");
    }

    kept
}
