// Use-case level outputs delivered to connections.

use crate::domain::{GameOutcome, MovePayload, Side, StatsSnapshot};

/// Events queued on a connection's outbound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyEvent {
    GameFound {
        match_id: String,
        side: Side,
        opponent: String,
        opponent_elo: u32,
    },
    OpponentMove {
        match_id: String,
        payload: MovePayload,
    },
    GameOver {
        match_id: String,
        outcome: GameOutcome,
    },
    LobbyStats(StatsSnapshot),
}

impl LobbyEvent {
    // Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LobbyEvent::GameFound { .. } => "game_found",
            LobbyEvent::OpponentMove { .. } => "opponent_move",
            LobbyEvent::GameOver { .. } => "game_over",
            LobbyEvent::LobbyStats(_) => "lobby_stats",
        }
    }
}

/// Operational view of the lobby served over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyStatus {
    pub stats: StatsSnapshot,
    // True while a player holds the waiting slot.
    pub searching: bool,
    pub active_matches: usize,
}

/// Result of a search request, reported back to the caller for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    // The caller now holds the waiting slot.
    Waiting,
    // The caller already held the waiting slot; nothing changed.
    AlreadyWaiting,
    // The caller is seated in an active match.
    InMatch,
    // The caller was paired with the waiting player.
    Matched { match_id: String },
    // The connection is no longer registered.
    UnknownConnection,
}
