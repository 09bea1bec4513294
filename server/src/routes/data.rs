//! Snapshot store routes.

#[cfg(test)]
#[path = "data_test.rs"]
mod data_test;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routes::RelayError;
use crate::routes::auth::BearerToken;
use crate::services::room;
use crate::state::RelayState;

/// Request and response body of the data endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContentBody {
    #[serde(default)]
    pub content: Value,
}

/// `GET /api/canvases/:id/data`: the stored snapshot, `null` if none.
pub async fn get_data(
    State(state): State<RelayState>,
    _token: BearerToken,
    Path(canvas_id): Path<String>,
) -> Json<ContentBody> {
    Json(ContentBody { content: room::load_content(&state, &canvas_id).await })
}

/// `POST /api/canvases/:id/data`: replace the stored snapshot.
pub async fn save_data(
    State(state): State<RelayState>,
    _token: BearerToken,
    Path(canvas_id): Path<String>,
    Json(body): Json<ContentBody>,
) -> Result<StatusCode, RelayError> {
    if !body.content.is_object() {
        return Err(RelayError::InvalidContent);
    }
    room::save_content(&state, &canvas_id, body.content).await;
    Ok(StatusCode::NO_CONTENT)
}
