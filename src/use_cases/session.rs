// Match table: routes moves and terminal events between the two seated connections.

use crate::domain::{ConnectionId, GameOutcome, Match, OutcomeReason, Side};
use std::collections::HashMap;
use std::fmt;

/// Reasons a match operation had no effect.
///
/// These are never surfaced to clients; the network layer only logs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No active match with this id (never created, or already terminal).
    UnknownMatch,
    /// The sender is not seated in the match.
    NotParticipant,
    /// The opponent's connection is no longer registered.
    RecipientGone,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownMatch => write!(f, "unknown or finished match"),
            SessionError::NotParticipant => write!(f, "sender is not a participant"),
            SessionError::RecipientGone => write!(f, "opponent connection is gone"),
        }
    }
}

impl std::error::Error for SessionError {}

/// A match that just became terminal, with the notification owed to the survivor.
#[derive(Debug)]
pub struct Completion {
    pub game: Match,
    pub recipient: ConnectionId,
    pub outcome: GameOutcome,
}

#[derive(Debug, Default)]
pub struct MatchTable {
    // Active matches only; terminal matches are removed so later events are ignored.
    matches: HashMap<String, Match>,
}

impl MatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, game: Match) {
        self.matches.insert(game.match_id.clone(), game);
    }

    #[cfg(test)]
    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.matches.get(match_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Resolves the connection a move from `from` should be forwarded to.
    pub fn relay_target(
        &self,
        match_id: &str,
        from: ConnectionId,
    ) -> Result<ConnectionId, SessionError> {
        let game = self
            .matches
            .get(match_id)
            .ok_or(SessionError::UnknownMatch)?;
        game.opponent_of(from).ok_or(SessionError::NotParticipant)
    }

    /// Ends the match on a participant's report and forwards the reported winner.
    pub fn report_game_over(
        &mut self,
        match_id: &str,
        from: ConnectionId,
        winner: Side,
    ) -> Result<Completion, SessionError> {
        let recipient = self.relay_target(match_id, from)?;
        let game = self
            .matches
            .remove(match_id)
            .ok_or(SessionError::UnknownMatch)?;
        Ok(Completion {
            game,
            recipient,
            outcome: GameOutcome {
                winner,
                reason: OutcomeReason::Reported,
            },
        })
    }

    /// Ends the match because `leaver` disconnected; the remaining side wins.
    pub fn participant_left(&mut self, match_id: &str, leaver: ConnectionId) -> Option<Completion> {
        let leaver_side = self.matches.get(match_id)?.side_of(leaver)?;
        let game = self.matches.remove(match_id)?;
        let winner = leaver_side.opposite();
        Some(Completion {
            recipient: game.seat(winner).conn_id,
            game,
            outcome: GameOutcome {
                winner,
                reason: OutcomeReason::OpponentDisconnected,
            },
        })
    }
}
