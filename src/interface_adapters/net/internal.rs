use crate::interface_adapters::protocol::LobbyStatusDto;
use crate::interface_adapters::state::AppState;

use axum::extract::{Json, State};
use std::sync::Arc;

// Broadcast snapshot plus slot and match occupancy, for probes and dashboards.
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<LobbyStatusDto> {
    Json(state.lobby.status().await.into())
}
