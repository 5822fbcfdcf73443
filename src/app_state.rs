//! Shared application state injected into all Axum handlers.

use crate::hub::HubHandle;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle into the hub's event queue.
    pub hub: HubHandle,
    /// The single origin allowed to open WebSocket connections.
    pub allowed_origin: String,
}
