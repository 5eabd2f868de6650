use crate::domain::Clock;
use crate::use_cases::Lobby;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Instant;

// Shared application state for the HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    pub lobby: Arc<Lobby>,
}

// System clock adapter; dates follow the server's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
