// src/ingest/providers/sheets.rs
//! Row-shaped source: `GET <endpoint>?id=<sheet id>` returning
//! `{values: string[][]}` with the header row first.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::event::Event;
use crate::ingest::providers::upstream_error_message;
use crate::ingest::types::{EventSource, IngestError, RowTable};

pub struct SheetsSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl SheetsSource {
    pub fn from_url(endpoint: &str, sheet_id: &str) -> Self {
        Self {
            mode: Mode::Http {
                url: format!("{endpoint}?id={sheet_id}"),
                client: reqwest::Client::new(),
            },
        }
    }

    /// Parse a canned body instead of fetching; used by tests and demos.
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse_body(body: &str) -> Result<Vec<Event>, IngestError> {
        let t0 = Instant::now();
        let table: RowTable = serde_json::from_str(body)
            .map_err(|e| IngestError::Shape(format!("expected {{values: string[][]}}: {e}")))?;
        let events = crate::ingest::normalize_table(&table);
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(events)
    }
}

#[async_trait]
impl EventSource for SheetsSource {
    async fn fetch_events(&self) -> Result<Vec<Event>, IngestError> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),

            Mode::Http { url, client } => {
                let resp = match client.get(url).send().await {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::warn!(error = ?e, source = "sheets", "source http error");
                        counter!("ingest_source_errors_total").increment(1);
                        return Err(e.into());
                    }
                };
                let status = resp.status();
                if !status.is_success() {
                    counter!("ingest_source_errors_total").increment(1);
                    let message = upstream_error_message(resp).await;
                    return Err(IngestError::Status {
                        status: status.as_u16(),
                        message,
                    });
                }
                let body = resp.text().await?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "sheets"
    }
}
