// Aggregate lobby statistics: recent wait times and completed games per day.

use chrono::NaiveDate;
use std::collections::VecDeque;

/// Bounded window of the most recent wait-time samples, in seconds.
#[derive(Debug, Clone)]
pub struct RollingWaitSamples {
    capacity: usize,
    samples: VecDeque<u64>,
}

impl RollingWaitSamples {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a sample, evicting the oldest ones once capacity is exceeded.
    pub fn push(&mut self, seconds: u64) {
        if self.capacity == 0 {
            return;
        }
        self.samples.push_back(seconds);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Mean of the current samples rounded to the nearest second; zero when empty.
    pub fn average_seconds(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let total: u64 = self.samples.iter().sum();
        (total as f64 / self.samples.len() as f64).round() as u64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &u64> {
        self.samples.iter()
    }
}

/// Count of matches completed since the last local-date rollover.
#[derive(Debug, Clone)]
pub struct DailyCounter {
    count: u64,
    date: NaiveDate,
}

impl DailyCounter {
    pub fn new(date: NaiveDate) -> Self {
        Self { count: 0, date }
    }

    pub fn increment(&mut self) {
        self.count += 1;
    }

    /// Resets the counter when `today` differs from the stored date.
    /// Returns true if a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today == self.date {
            return false;
        }
        self.count = 0;
        self.date = today;
        true
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    #[cfg(test)]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Point-in-time read of the lobby statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub active_players: usize,
    pub games_completed_today: u64,
    pub average_wait_seconds: u64,
}
