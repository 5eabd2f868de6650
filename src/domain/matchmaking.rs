use crate::domain::ConnectionId;
use std::time::{Duration, Instant};
use uuid::Uuid;

// Fixed seat within a match; white always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

// The single pending search held by the matchmaker.
#[derive(Debug, Clone)]
pub struct WaitingTicket {
    pub conn_id: ConnectionId,
    pub display_name: String,
    pub searched_at: Instant,
}

impl WaitingTicket {
    pub fn new(conn_id: ConnectionId, display_name: String, searched_at: Instant) -> Self {
        Self {
            conn_id,
            display_name,
            searched_at,
        }
    }

    // Whole seconds spent waiting, rounded to the nearest second.
    pub fn waited_seconds(&self, now: Instant) -> u64 {
        let waited = now
            .checked_duration_since(self.searched_at)
            .unwrap_or(Duration::ZERO);
        (waited.as_millis() as f64 / 1000.0).round() as u64
    }
}

// Build a match identifier that stays unique across concurrent matches.
pub fn build_match_id() -> String {
    format!("game_{}", Uuid::new_v4().simple())
}
