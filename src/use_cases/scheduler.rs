// Background timers: periodic stats fan-out and the daily counter rollover.

use crate::use_cases::Lobby;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Broadcasts a LOBBY_STATS snapshot to every connection on a fixed interval.
pub async fn stats_broadcast_task(lobby: Arc<Lobby>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let fan_out = lobby.broadcast_stats().await;
        debug!(fan_out, "lobby stats broadcast");
    }
}

/// Checks the local date on a fixed interval and resets the daily counter on change.
pub async fn daily_reset_task(lobby: Arc<Lobby>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        lobby.roll_daily_counter().await;
    }
}

/// Spawns both timers using the lobby's configured intervals.
pub fn spawn_background_tasks(lobby: &Arc<Lobby>) -> [JoinHandle<()>; 2] {
    let settings = lobby.settings();
    [
        tokio::spawn(stats_broadcast_task(lobby.clone(), settings.stats_interval)),
        tokio::spawn(daily_reset_task(
            lobby.clone(),
            settings.daily_reset_check_interval,
        )),
    ]
}
