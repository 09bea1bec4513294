//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The relay serves the two collaborators a canvas client talks to: the
//! snapshot store under `/api/canvases/{id}/data` and the per-canvas
//! websocket room under `/ws/canvas/{id}`. Both require a bearer token but
//! treat it as opaque.

pub mod auth;
pub mod data;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::RelayState;

/// Errors returned to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("bearer token required")]
    Unauthorized,
    #[error("content must be a JSON object")]
    InvalidContent,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidContent => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Build the relay router.
pub fn app(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/canvases/{id}/data", get(data::get_data).post(data::save_data))
        .route("/ws/canvas/{id}", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
