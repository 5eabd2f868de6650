use crate::interface_adapters::net::{stats_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use axum::{Router, routing::get};
use std::sync::Arc;

// Build the router for the lobby WebSocket and its HTTP probes.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}
