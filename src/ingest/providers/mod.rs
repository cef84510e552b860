// src/ingest/providers/mod.rs
pub mod manifest;
pub mod sheets;

/// Non-2xx bodies may carry `{"error": "..."}`; surface that message when
/// present so the operator sees the upstream's own explanation.
pub(crate) async fn upstream_error_message(resp: reqwest::Response) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }
    match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => "upstream error".to_string(),
    }
}
