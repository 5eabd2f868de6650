// Domain-level match records and the payloads relayed between participants.

use crate::domain::{ConnectionId, Side};
use std::time::{Duration, Instant};

/// One participant seated in a match.
#[derive(Debug, Clone)]
pub struct Seat {
    pub conn_id: ConnectionId,
    pub display_name: String,
}

/// A paired two-player session.
#[derive(Debug, Clone)]
pub struct Match {
    pub match_id: String,
    pub white: Seat,
    pub black: Seat,
    pub created_at: Instant,
}

impl Match {
    pub fn new(match_id: String, white: Seat, black: Seat, created_at: Instant) -> Self {
        Self {
            match_id,
            white,
            black,
            created_at,
        }
    }

    pub fn seat(&self, side: Side) -> &Seat {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    /// Returns the side the connection plays, or `None` for outsiders.
    pub fn side_of(&self, conn_id: ConnectionId) -> Option<Side> {
        if self.white.conn_id == conn_id {
            Some(Side::White)
        } else if self.black.conn_id == conn_id {
            Some(Side::Black)
        } else {
            None
        }
    }

    /// Time since pairing; zero if `now` reads earlier than the pairing instant.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Returns the other participant's connection for a seated connection.
    pub fn opponent_of(&self, conn_id: ConnectionId) -> Option<ConnectionId> {
        self.side_of(conn_id)
            .map(|side| self.seat(side.opposite()).conn_id)
    }
}

/// Opaque move data forwarded verbatim; legality is the client's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePayload {
    // Board position after the move (FEN-like string).
    pub position: String,
    pub next_turn: Side,
    // Optional move history encoding supplied by the client.
    pub pgn: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeReason {
    // A participant reported checkmate, resignation or timeout.
    Reported,
    // The server ended the match because one side left.
    OpponentDisconnected,
}

/// Terminal result delivered to the remaining participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: Side,
    pub reason: OutcomeReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> Match {
        Match::new(
            "game_1".to_string(),
            Seat {
                conn_id: ConnectionId(1),
                display_name: "Ana".to_string(),
            },
            Seat {
                conn_id: ConnectionId(2),
                display_name: "Ben".to_string(),
            },
            Instant::now(),
        )
    }

    #[test]
    fn when_participant_is_seated_then_side_and_opponent_resolve() {
        let game = sample_match();

        assert_eq!(game.side_of(ConnectionId(1)), Some(Side::White));
        assert_eq!(game.side_of(ConnectionId(2)), Some(Side::Black));
        assert_eq!(game.opponent_of(ConnectionId(1)), Some(ConnectionId(2)));
        assert_eq!(game.opponent_of(ConnectionId(2)), Some(ConnectionId(1)));
    }

    #[test]
    fn when_elapsed_is_measured_then_it_never_goes_negative() {
        let game = sample_match();
        let later = game.created_at + Duration::from_secs(42);

        assert_eq!(game.elapsed(later), Duration::from_secs(42));
        assert_eq!(
            game.elapsed(game.created_at - Duration::from_millis(1)),
            Duration::ZERO
        );
    }

    #[test]
    fn when_connection_is_not_seated_then_it_has_no_side_or_opponent() {
        let game = sample_match();

        assert_eq!(game.side_of(ConnectionId(3)), None);
        assert_eq!(game.opponent_of(ConnectionId(3)), None);
    }
}
