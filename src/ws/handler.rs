//! Axum WebSocket upgrade handler with origin policy.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::{IntoResponse, Response};

use super::pump::{MAX_MESSAGE_SIZE, run_connection};
use crate::app_state::AppState;
use crate::error::RelayError;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// The request's `Origin` header must exactly match the configured
/// allowed origin; a missing header compares as the empty string, so a
/// server configured with an empty allowed origin accepts header-less
/// (non-browser) clients. Mismatches are refused with `403` and logged.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let origin = headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if origin != state.allowed_origin.as_str() {
        tracing::warn!(origin, "rejected upgrade: origin not allowed");
        return RelayError::OriginForbidden.into_response();
    }

    let hub = state.hub.clone();
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| run_connection(socket, hub))
}
