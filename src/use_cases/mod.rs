// Use cases layer: lobby workflows over the domain types.

pub mod lobby;
pub mod matchmaker;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use lobby::{Lobby, LobbySettings};
pub use types::{LobbyEvent, LobbyStatus, SearchOutcome};
