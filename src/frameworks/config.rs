use crate::use_cases::LobbySettings;
use std::{env, net::IpAddr, str::FromStr, time::Duration};

// Runtime/server constants (not protocol contracts).

pub const WAIT_SAMPLE_CAPACITY: usize = 20;
pub const OUTBOX_CAPACITY: usize = 64;
// Ratings are not computed; both players see this value.
pub const MOCK_OPPONENT_ELO: u32 = 1200;

const DEFAULT_STATS_INTERVAL_MS: u64 = 5_000;
const DEFAULT_DAILY_RESET_CHECK_MS: u64 = 60_000;

// Read an env var, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok(), default)
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

pub fn http_host() -> IpAddr {
    env_or("LOBBY_SERVER_HOST", IpAddr::from([127, 0, 0, 1]))
}

pub fn http_port() -> u16 {
    env_or("LOBBY_SERVER_PORT", 3002)
}

pub fn stats_interval() -> Duration {
    stats_interval_from(env::var("LOBBY_STATS_INTERVAL_MS").ok())
}

pub fn daily_reset_check_interval() -> Duration {
    daily_reset_check_interval_from(env::var("LOBBY_DAILY_RESET_CHECK_MS").ok())
}

fn stats_interval_from(raw: Option<String>) -> Duration {
    let millis = parse_or(raw, DEFAULT_STATS_INTERVAL_MS);
    Duration::from_millis(millis.max(1))
}

fn daily_reset_check_interval_from(raw: Option<String>) -> Duration {
    // The rollover must be observed at least once per minute.
    let millis = parse_or(raw, DEFAULT_DAILY_RESET_CHECK_MS).clamp(1, DEFAULT_DAILY_RESET_CHECK_MS);
    Duration::from_millis(millis)
}

pub fn lobby_settings() -> LobbySettings {
    LobbySettings {
        wait_sample_capacity: WAIT_SAMPLE_CAPACITY,
        outbox_capacity: OUTBOX_CAPACITY,
        opponent_elo: MOCK_OPPONENT_ELO,
        stats_interval: stats_interval(),
        daily_reset_check_interval: daily_reset_check_interval(),
    }
}
