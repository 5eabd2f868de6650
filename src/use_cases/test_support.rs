use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::domain::Clock;
use crate::use_cases::{Lobby, LobbySettings};

// Hand-driven time source for deterministic wait and rollover tests.
pub(crate) struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
    date: Mutex<NaiveDate>,
}

impl ManualClock {
    pub(crate) fn new(date: NaiveDate) -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            date: Mutex::new(date),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().expect("clock mutex poisoned");
        *offset += by;
    }

    pub(crate) fn set_date(&self, date: NaiveDate) {
        *self.date.lock().expect("clock mutex poisoned") = date;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().expect("clock mutex poisoned")
    }

    fn local_date(&self) -> NaiveDate {
        *self.date.lock().expect("clock mutex poisoned")
    }
}

pub(crate) fn test_settings() -> LobbySettings {
    LobbySettings {
        wait_sample_capacity: 20,
        outbox_capacity: 64,
        opponent_elo: 1200,
        stats_interval: Duration::from_secs(5),
        daily_reset_check_interval: Duration::from_secs(60),
    }
}

pub(crate) fn test_lobby() -> (Arc<Lobby>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid test date"),
    ));
    let lobby = Arc::new(Lobby::new(test_settings(), clock.clone()));
    (lobby, clock)
}
