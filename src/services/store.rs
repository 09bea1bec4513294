//! Document storage collaborator.
//!
//! DESIGN
//! ======
//! The sync core only needs two calls from storage: load a canvas's content
//! and overwrite it with a full snapshot. [`CanvasStore`] is that seam;
//! [`HttpStore`] talks to the canvas service's data endpoint
//! (`/api/canvases/{id}/data`) with an opaque bearer token.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-success statuses, and undecodable bodies map to
//! [`StoreError`]. Content entries that do not parse are skipped on load and
//! counted in a warning rather than failing the whole load.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::time::Duration;

use async_trait::async_trait;
use canvas::doc::Document;
use serde_json::Value;
use tracing::warn;

/// Errors from the storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid content json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load and save full canvas snapshots.
#[async_trait]
pub trait CanvasStore: Send + Sync {
    /// Fetch the stored content of `canvas_id`. Missing content is an empty document.
    async fn load(&self, canvas_id: &str, token: &str) -> Result<Document, StoreError>;

    /// Overwrite the stored content of `canvas_id` with `content`.
    async fn save(&self, canvas_id: &str, token: &str, content: &Document) -> Result<(), StoreError>;
}

/// [`CanvasStore`] over the canvas service's HTTP data endpoint.
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// Build a store for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn data_url(&self, canvas_id: &str) -> String {
        format!("{}/api/canvases/{canvas_id}/data", self.base_url)
    }
}

#[async_trait]
impl CanvasStore for HttpStore {
    async fn load(&self, canvas_id: &str, token: &str) -> Result<Document, StoreError> {
        let response = self.client.get(self.data_url(canvas_id)).bearer_auth(token).send().await?;
        let body = check_status(response).await?.json::<Value>().await?;
        let (document, skipped) = content_from_body(&body);
        if skipped > 0 {
            warn!(canvas_id, skipped, "skipped unparseable entries in stored content");
        }
        Ok(document)
    }

    async fn save(&self, canvas_id: &str, token: &str, content: &Document) -> Result<(), StoreError> {
        let body = serde_json::json!({ "content": content });
        let response = self.client.post(self.data_url(canvas_id)).bearer_auth(token).json(&body).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status: status.as_u16(), body })
}

/// Extract the document from a `{ content: {...} }` response body.
///
/// A missing or null `content` yields an empty document.
pub(crate) fn content_from_body(body: &Value) -> (Document, usize) {
    match body.get("content") {
        Some(content) if content.is_object() => Document::from_value_lenient(content),
        _ => (Document::default(), 0),
    }
}
