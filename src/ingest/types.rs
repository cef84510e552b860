// src/ingest/types.rs
use serde::Deserialize;

use crate::event::Event;

/// Raw tabular payload from the sheet endpoint. Row 0 is the header row.
#[derive(Debug, Clone, Deserialize)]
pub struct RowTable {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Why a fetch produced no events. Network trouble, an upstream error
/// status, and a body that fails the shape check are all handled the same
/// way by the orchestrator: fall back to cache when possible.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("event source request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("event source returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response shape: {0}")]
    Shape(String),
}

/// A place events come from. Implementations fetch and normalize; caching
/// and fallback belong to the orchestrator.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<Event>, IngestError>;
    fn name(&self) -> &'static str;
}
