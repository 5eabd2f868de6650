use chrono::NaiveDate;
use std::time::Instant;

// Port for reading time so pairing waits and daily rollover are testable.
pub trait Clock: Send + Sync {
    // Monotonic instant used for wait-time measurements.
    fn now(&self) -> Instant;
    // Calendar date in the server's local timezone.
    fn local_date(&self) -> NaiveDate;
}
