use crate::domain::matchmaking::build_match_id;
use crate::domain::{ConnectionId, Match, Seat, WaitingTicket};
use std::time::Instant;

// Outcome returned after a player asks to be matched.
#[derive(Debug)]
pub enum MatchOutcome {
    Waiting,
    AlreadyWaiting,
    Matched {
        // Newly allocated match; the waiting party plays white.
        game: Match,
        // Seconds the waiting party spent in the slot.
        waited_seconds: u64,
    },
}

// Single-slot matchmaker: pairs the next searcher with whoever is waiting.
#[derive(Debug, Default)]
pub struct Matchmaker {
    waiting: Option<WaitingTicket>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self { waiting: None }
    }

    // Take the waiting slot or pair with its holder.
    pub fn request_match(
        &mut self,
        conn_id: ConnectionId,
        display_name: String,
        now: Instant,
    ) -> MatchOutcome {
        match self.waiting.take() {
            None => {
                self.waiting = Some(WaitingTicket::new(conn_id, display_name, now));
                MatchOutcome::Waiting
            }
            Some(ticket) if ticket.conn_id == conn_id => {
                // Same connection searching twice; keep the original ticket and start time.
                self.waiting = Some(ticket);
                MatchOutcome::AlreadyWaiting
            }
            Some(ticket) => {
                // Only the party that was already waiting contributes a wait sample.
                let waited_seconds = ticket.waited_seconds(now);
                let game = Match::new(
                    build_match_id(),
                    Seat {
                        conn_id: ticket.conn_id,
                        display_name: ticket.display_name,
                    },
                    Seat {
                        conn_id,
                        display_name,
                    },
                    now,
                );
                MatchOutcome::Matched {
                    game,
                    waited_seconds,
                }
            }
        }
    }

    // Withdraw the caller's ticket. Returns true if a ticket was cleared.
    pub fn cancel(&mut self, conn_id: ConnectionId) -> bool {
        if self
            .waiting
            .as_ref()
            .is_some_and(|ticket| ticket.conn_id == conn_id)
        {
            self.waiting = None;
            return true;
        }
        false
    }

    pub fn waiting(&self) -> Option<&WaitingTicket> {
        self.waiting.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use std::time::Duration;

    #[test]
    fn when_slot_is_empty_then_caller_takes_it() {
        let mut matchmaker = Matchmaker::new();
        let now = Instant::now();

        let outcome = matchmaker.request_match(ConnectionId(1), "Ana".to_string(), now);

        assert!(matches!(outcome, MatchOutcome::Waiting));
        let ticket = matchmaker.waiting().expect("expected a waiting ticket");
        assert_eq!(ticket.conn_id, ConnectionId(1));
        assert_eq!(ticket.display_name, "Ana");
    }

    #[test]
    fn when_same_connection_searches_twice_then_single_ticket_keeps_start_time() {
        let mut matchmaker = Matchmaker::new();
        let start = Instant::now();
        matchmaker.request_match(ConnectionId(1), "Ana".to_string(), start);

        let outcome = matchmaker.request_match(
            ConnectionId(1),
            "Ana".to_string(),
            start + Duration::from_secs(3),
        );

        assert!(matches!(outcome, MatchOutcome::AlreadyWaiting));
        let ticket = matchmaker.waiting().expect("expected a waiting ticket");
        assert_eq!(ticket.conn_id, ConnectionId(1));
        assert_eq!(ticket.searched_at, start);
    }

    #[test]
    fn when_second_player_searches_then_waiting_player_is_white_and_slot_clears() {
        let mut matchmaker = Matchmaker::new();
        let start = Instant::now();
        matchmaker.request_match(ConnectionId(1), "Ana".to_string(), start);

        let outcome = matchmaker.request_match(
            ConnectionId(2),
            "Ben".to_string(),
            start + Duration::from_secs(4),
        );

        let MatchOutcome::Matched {
            game,
            waited_seconds,
        } = outcome
        else {
            panic!("expected a match");
        };
        assert_eq!(waited_seconds, 4);
        assert_eq!(game.side_of(ConnectionId(1)), Some(Side::White));
        assert_eq!(game.side_of(ConnectionId(2)), Some(Side::Black));
        assert_eq!(game.seat(Side::White).display_name, "Ana");
        assert_eq!(game.seat(Side::Black).display_name, "Ben");
        assert!(matchmaker.waiting().is_none());
    }

    #[test]
    fn when_requests_arrive_in_sequence_then_at_most_one_ticket_exists() {
        let mut matchmaker = Matchmaker::new();
        let now = Instant::now();
        let mut matches = 0;

        for id in 1..=7 {
            if let MatchOutcome::Matched { .. } =
                matchmaker.request_match(ConnectionId(id), format!("p{id}"), now)
            {
                matches += 1;
            }
        }

        assert_eq!(matches, 3);
        assert_eq!(
            matchmaker.waiting().map(|ticket| ticket.conn_id),
            Some(ConnectionId(7))
        );
    }

    #[test]
    fn when_holder_cancels_then_slot_is_cleared() {
        let mut matchmaker = Matchmaker::new();
        matchmaker.request_match(ConnectionId(1), "Ana".to_string(), Instant::now());

        assert!(matchmaker.cancel(ConnectionId(1)));
        assert!(matchmaker.waiting().is_none());
    }

    #[test]
    fn when_other_connection_cancels_then_slot_is_kept() {
        let mut matchmaker = Matchmaker::new();
        matchmaker.request_match(ConnectionId(1), "Ana".to_string(), Instant::now());

        assert!(!matchmaker.cancel(ConnectionId(2)));
        assert!(matchmaker.waiting().is_some());
    }
}
