use crate::domain::{DailyCounter, RollingWaitSamples, StatsSnapshot};
use chrono::NaiveDate;

// Rolling wait samples plus the daily completed-game counter.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    wait_samples: RollingWaitSamples,
    daily: DailyCounter,
}

impl StatsAggregator {
    pub fn new(sample_capacity: usize, today: NaiveDate) -> Self {
        Self {
            wait_samples: RollingWaitSamples::new(sample_capacity),
            daily: DailyCounter::new(today),
        }
    }

    pub fn record_wait(&mut self, seconds: u64) {
        self.wait_samples.push(seconds);
    }

    pub fn record_completion(&mut self) {
        self.daily.increment();
    }

    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        self.daily.roll_over(today)
    }

    pub fn snapshot(&self, active_players: usize) -> StatsSnapshot {
        StatsSnapshot {
            active_players,
            games_completed_today: self.daily.count(),
            average_wait_seconds: self.wait_samples.average_seconds(),
        }
    }
}
