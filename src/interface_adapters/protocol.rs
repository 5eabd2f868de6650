// Wire protocol DTOs and conversions for the lobby WebSocket.
// Every frame is a JSON text message shaped as {"type": "...", "data": {...}}.

use crate::domain::{GameOutcome, MovePayload, OutcomeReason, Side, StatsSnapshot};
use crate::use_cases::{LobbyEvent, LobbyStatus};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    // Pairing result, sent individually to each side.
    GameFound(GameFoundDto),
    // A move made by the opponent.
    OpponentMove(OpponentMoveDto),
    // Terminal result relayed from the opponent or synthesized on disconnect.
    GameOver(GameOverDto),
    // Periodic lobby-wide statistics.
    LobbyStats(LobbyStatsDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    // `data` may be omitted; the player then searches under the default name.
    SearchGame(Option<SearchGamePayload>),
    // Sent without a data field: {"type": "CANCEL_SEARCH"}.
    CancelSearch,
    MakeMove(MakeMovePayload),
    GameOver(GameOverPayload),
}

/// Seat color as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorDto {
    White,
    Black,
}

impl From<Side> for ColorDto {
    fn from(side: Side) -> Self {
        match side {
            Side::White => ColorDto::White,
            Side::Black => ColorDto::Black,
        }
    }
}

impl From<ColorDto> for Side {
    fn from(color: ColorDto) -> Self {
        match color {
            ColorDto::White => Side::White,
            ColorDto::Black => Side::Black,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchGamePayload {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMovePayload {
    pub game_id: String,
    // Board position after the move; relayed untouched.
    #[serde(rename = "move")]
    pub position: String,
    pub next_turn: ColorDto,
    #[serde(default)]
    pub pgn: Option<String>,
}

impl MakeMovePayload {
    pub fn into_parts(self) -> (String, MovePayload) {
        (
            self.game_id,
            MovePayload {
                position: self.position,
                next_turn: self.next_turn.into(),
                pgn: self.pgn,
            },
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverPayload {
    pub game_id: String,
    pub winner: ColorDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFoundDto {
    pub game_id: String,
    pub color: ColorDto,
    pub opponent: String,
    pub opponent_elo: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentMoveDto {
    #[serde(rename = "move")]
    pub position: String,
    pub next_turn: ColorDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgn: Option<String>,
}

impl From<MovePayload> for OpponentMoveDto {
    fn from(payload: MovePayload) -> Self {
        Self {
            position: payload.position,
            next_turn: payload.next_turn.into(),
            pgn: payload.pgn,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReasonDto {
    OpponentDisconnected,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverDto {
    pub game_id: String,
    pub winner: ColorDto,
    // Only present when the server ended the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<GameOverReasonDto>,
}

impl GameOverDto {
    fn new(game_id: String, outcome: GameOutcome) -> Self {
        let reason = match outcome.reason {
            OutcomeReason::Reported => None,
            OutcomeReason::OpponentDisconnected => Some(GameOverReasonDto::OpponentDisconnected),
        };
        Self {
            game_id,
            winner: outcome.winner.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStatsDto {
    pub active_players: usize,
    pub games_completed_today: u64,
    // Rounded mean of recent waits, in seconds.
    pub avg_wait_time: u64,
}

/// HTTP status body: the broadcast fields plus lobby occupancy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStatusDto {
    #[serde(flatten)]
    pub stats: LobbyStatsDto,
    pub searching: bool,
    pub active_matches: usize,
}

impl From<LobbyStatus> for LobbyStatusDto {
    fn from(status: LobbyStatus) -> Self {
        Self {
            stats: status.stats.into(),
            searching: status.searching,
            active_matches: status.active_matches,
        }
    }
}

impl From<StatsSnapshot> for LobbyStatsDto {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            active_players: snapshot.active_players,
            games_completed_today: snapshot.games_completed_today,
            avg_wait_time: snapshot.average_wait_seconds,
        }
    }
}

impl From<LobbyEvent> for ServerMessage {
    fn from(event: LobbyEvent) -> Self {
        match event {
            LobbyEvent::GameFound {
                match_id,
                side,
                opponent,
                opponent_elo,
            } => ServerMessage::GameFound(GameFoundDto {
                game_id: match_id,
                color: side.into(),
                opponent,
                opponent_elo,
            }),
            LobbyEvent::OpponentMove { payload, .. } => ServerMessage::OpponentMove(payload.into()),
            LobbyEvent::GameOver { match_id, outcome } => {
                ServerMessage::GameOver(GameOverDto::new(match_id, outcome))
            }
            LobbyEvent::LobbyStats(snapshot) => ServerMessage::LobbyStats(snapshot.into()),
        }
    }
}
