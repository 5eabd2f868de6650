// Domain layer: lobby entities and the rules that govern them.

pub mod connection;
pub mod matchmaking;
pub mod ports;
pub mod session;
pub mod stats;

pub use connection::ConnectionId;
pub use matchmaking::{Side, WaitingTicket};
pub use ports::Clock;
pub use session::{GameOutcome, Match, MovePayload, OutcomeReason, Seat};
pub use stats::{DailyCounter, RollingWaitSamples, StatsSnapshot};
