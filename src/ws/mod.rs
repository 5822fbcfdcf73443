//! WebSocket layer: upgrade handling and the per-connection pump.
//!
//! The single endpoint at `/ws` upgrades to a bidirectional connection;
//! everything a client sends is handed to the hub for fan-out.

pub mod handler;
pub mod pump;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Builds the router exposing the WebSocket upgrade route.
pub fn build_router() -> Router<AppState> {
    Router::new().route("/ws", get(handler::ws_handler))
}
