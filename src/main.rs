//! relay-hub server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket upgrade endpoint and
//! spawns the hub's event loop.

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use relay_hub::app_state::AppState;
use relay_hub::config::HubConfig;
use relay_hub::hub::Hub;
use relay_hub::ws;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = HubConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting relay-hub");

    // Spawn the hub's event loop
    let (hub, registry) = Hub::new(config.hub_queue_capacity);
    tokio::spawn(registry.run());

    // Build application state
    let app_state = AppState {
        hub,
        allowed_origin: config.allowed_origin,
    };

    // Build router
    let app = ws::build_router()
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
