// src/ingest/providers/manifest.rs
//! Manifest source: `GET <endpoint>?id=<manifest id>` returning a JSON array
//! of already-shaped events. This is the older ingestion variant; the sheet
//! source replaced it for most pages but some manifests are still published
//! as plain files.

use async_trait::async_trait;
use metrics::counter;

use crate::event::Event;
use crate::ingest::providers::upstream_error_message;
use crate::ingest::types::{EventSource, IngestError};

pub struct ManifestSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl ManifestSource {
    pub fn from_url(endpoint: &str, manifest_id: &str) -> Self {
        Self {
            mode: Mode::Http {
                url: format!("{endpoint}?id={manifest_id}"),
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse_body(body: &str) -> Result<Vec<Event>, IngestError> {
        crate::ingest::ensure_metrics_described();
        let events: Vec<Event> = serde_json::from_str(body)
            .map_err(|e| IngestError::Shape(format!("expected an event array: {e}")))?;
        counter!("ingest_events_kept_total").increment(events.len() as u64);
        Ok(events)
    }
}

#[async_trait]
impl EventSource for ManifestSource {
    async fn fetch_events(&self) -> Result<Vec<Event>, IngestError> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),

            Mode::Http { url, client } => {
                let resp = match client.get(url).send().await {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::warn!(error = ?e, source = "manifest", "source http error");
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
        "manifest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, MediaSource};

    #[tokio::test]
    async fn fixture_array_deserializes() {
        let body = r#"[{
            "title": "Easter Concert",
            "kind": "video",
            "mediaRef": {"id": "dQw4w9WgXcQ", "source": "youtube"},
            "startDate": "2999-04-01",
            "endDate": "2999-04-01"
        }]"#;
        let events = ManifestSource::from_fixture(body)
            .fetch_events()
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Video);
        assert_eq!(events[0].media_ref.source, Some(MediaSource::YouTube));
    }

    #[tokio::test]
    async fn non_array_body_is_a_shape_error() {
        let result = ManifestSource::from_fixture(r#"{"error": "nope"}"#)
            .fetch_events()
            .await;
        assert!(matches!(result, Err(IngestError::Shape(_))));
    }
}
