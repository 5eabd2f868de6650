// Lobby orchestration: the single serialization point for matchmaking, match
// routing and statistics.

use crate::domain::{
    Clock, ConnectionId, GameOutcome, MovePayload, Side, StatsSnapshot, WaitingTicket,
};
use crate::use_cases::matchmaker::{MatchOutcome, Matchmaker};
use crate::use_cases::registry::ConnectionRegistry;
use crate::use_cases::session::{Completion, MatchTable, SessionError};
use crate::use_cases::stats::StatsAggregator;
use crate::use_cases::{LobbyEvent, LobbyStatus, SearchOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Shared configuration for the lobby and its background tasks.
#[derive(Debug, Clone)]
pub struct LobbySettings {
    /// Number of recent wait times kept for the moving average.
    pub wait_sample_capacity: usize,
    /// Capacity of each connection's outbound queue.
    pub outbox_capacity: usize,
    /// Rating reported to both players on pairing.
    pub opponent_elo: u32,
    /// Interval between LOBBY_STATS broadcasts.
    pub stats_interval: Duration,
    /// Interval between daily rollover checks.
    pub daily_reset_check_interval: Duration,
}

// Everything that must be mutated under one lock.
struct LobbyState {
    registry: ConnectionRegistry,
    matchmaker: Matchmaker,
    matches: MatchTable,
    stats: StatsAggregator,
}

type Delivery = (mpsc::Sender<LobbyEvent>, LobbyEvent);

/// Thread-safe lobby shared by every connection task.
pub struct Lobby {
    settings: LobbySettings,
    clock: Arc<dyn Clock>,
    state: Mutex<LobbyState>,
}

impl Lobby {
    pub fn new(settings: LobbySettings, clock: Arc<dyn Clock>) -> Self {
        let stats = StatsAggregator::new(settings.wait_sample_capacity, clock.local_date());
        Self {
            settings,
            clock,
            state: Mutex::new(LobbyState {
                registry: ConnectionRegistry::new(),
                matchmaker: Matchmaker::new(),
                matches: MatchTable::new(),
                stats,
            }),
        }
    }

    pub fn settings(&self) -> &LobbySettings {
        &self.settings
    }

    /// Registers a connection and hands back the receiving end of its outbound queue.
    pub async fn admit(&self) -> (ConnectionId, mpsc::Receiver<LobbyEvent>) {
        let (outbox_tx, outbox_rx) = mpsc::channel(self.settings.outbox_capacity);
        let conn_id = self.state.lock().await.registry.admit(outbox_tx);
        (conn_id, outbox_rx)
    }

    /// Drops a connection, releasing its waiting ticket and ending its match.
    pub async fn remove(&self, conn_id: ConnectionId) {
        let delivery = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let Some(entry) = state.registry.remove(conn_id) else {
                return;
            };

            if state.matchmaker.cancel(conn_id) {
                debug!(%conn_id, "waiting ticket released on disconnect");
            }

            entry.match_id.and_then(|match_id| {
                let completion = state.matches.participant_left(&match_id, conn_id)?;
                info!(
                    %match_id,
                    %conn_id,
                    winner = ?completion.outcome.winner,
                    duration_secs = completion.game.elapsed(self.clock.now()).as_secs(),
                    "participant disconnected; match ended"
                );
                finish_match(&mut state.registry, completion)
            })
        };

        if let Some((outbox, event)) = delivery {
            deliver(&outbox, event);
        }
    }

    pub async fn active_players(&self) -> usize {
        self.state.lock().await.registry.count()
    }

    /// Pairs the caller with the waiting player, or stores the caller's ticket.
    pub async fn request_match(&self, conn_id: ConnectionId, display_name: String) -> SearchOutcome {
        let (outcome, deliveries) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            if !state.registry.contains(conn_id) {
                return SearchOutcome::UnknownConnection;
            }
            if state.registry.match_of(conn_id).is_some() {
                return SearchOutcome::InMatch;
            }

            // A ticket whose connection vanished must never be offered.
            let stale = state
                .matchmaker
                .waiting()
                .map(|ticket| ticket.conn_id)
                .filter(|holder| !state.registry.contains(*holder));
            if let Some(holder) = stale {
                warn!(conn_id = %holder, "discarding stale waiting ticket");
                state.matchmaker.cancel(holder);
            }

            match state
                .matchmaker
                .request_match(conn_id, display_name, self.clock.now())
            {
                MatchOutcome::Waiting => (SearchOutcome::Waiting, Vec::new()),
                MatchOutcome::AlreadyWaiting => (SearchOutcome::AlreadyWaiting, Vec::new()),
                MatchOutcome::Matched {
                    game,
                    waited_seconds,
                } => {
                    state.stats.record_wait(waited_seconds);

                    let match_id = game.match_id.clone();
                    let mut deliveries: Vec<Delivery> = Vec::with_capacity(2);
                    for side in [Side::White, Side::Black] {
                        let seat = game.seat(side);
                        state.registry.set_match(seat.conn_id, &match_id);
                        if let Some(outbox) = state.registry.outbox(seat.conn_id) {
                            deliveries.push((
                                outbox,
                                LobbyEvent::GameFound {
                                    match_id: match_id.clone(),
                                    side,
                                    opponent: game.seat(side.opposite()).display_name.clone(),
                                    opponent_elo: self.settings.opponent_elo,
                                },
                            ));
                        }
                    }

                    info!(
                        %match_id,
                        white = %game.white.conn_id,
                        black = %game.black.conn_id,
                        waited_seconds,
                        "match found"
                    );
                    state.matches.insert(game);
                    (SearchOutcome::Matched { match_id }, deliveries)
                }
            }
        };

        for (outbox, event) in deliveries {
            deliver(&outbox, event);
        }
        outcome
    }

    /// Withdraws the caller's search. Returns true if a ticket was cleared.
    pub async fn cancel_search(&self, conn_id: ConnectionId) -> bool {
        self.state.lock().await.matchmaker.cancel(conn_id)
    }

    /// Forwards a move to the sender's opponent only.
    pub async fn relay_move(
        &self,
        match_id: &str,
        from: ConnectionId,
        payload: MovePayload,
    ) -> Result<(), SessionError> {
        let outbox = {
            let state = self.state.lock().await;
            let recipient = state.matches.relay_target(match_id, from)?;
            state
                .registry
                .outbox(recipient)
                .ok_or(SessionError::RecipientGone)?
        };

        deliver(
            &outbox,
            LobbyEvent::OpponentMove {
                match_id: match_id.to_string(),
                payload,
            },
        );
        Ok(())
    }

    /// Ends a match on a participant's report and counts it once.
    ///
    /// Succeeds once the result is recorded, even if the opponent can no longer be told.
    pub async fn report_game_over(
        &self,
        match_id: &str,
        from: ConnectionId,
        winner: Side,
    ) -> Result<(), SessionError> {
        let delivery = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let completion = state.matches.report_game_over(match_id, from, winner)?;
            state.stats.record_completion();
            info!(
                %match_id,
                reporter = %from,
                ?winner,
                duration_secs = completion.game.elapsed(self.clock.now()).as_secs(),
                "game over"
            );
            finish_match(&mut state.registry, completion)
        };

        match delivery {
            Some((outbox, event)) => deliver(&outbox, event),
            None => debug!(%match_id, "opponent gone; result recorded without relay"),
        }
        Ok(())
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let state = self.state.lock().await;
        state.stats.snapshot(state.registry.count())
    }

    /// Snapshot plus slot and match occupancy, read under one lock.
    pub async fn status(&self) -> LobbyStatus {
        let state = self.state.lock().await;
        LobbyStatus {
            stats: state.stats.snapshot(state.registry.count()),
            searching: state.matchmaker.waiting().is_some(),
            active_matches: state.matches.len(),
        }
    }

    /// Queues the current snapshot on every connection. Returns the fan-out size.
    pub async fn broadcast_stats(&self) -> usize {
        let (snapshot, outboxes) = {
            let state = self.state.lock().await;
            (
                state.stats.snapshot(state.registry.count()),
                state.registry.outboxes(),
            )
        };

        for outbox in &outboxes {
            deliver(outbox, LobbyEvent::LobbyStats(snapshot));
        }
        outboxes.len()
    }

    /// Resets the completed-game counter when the local date changed.
    pub async fn roll_daily_counter(&self) -> bool {
        let today = self.clock.local_date();
        let rolled = self.state.lock().await.stats.roll_over(today);
        if rolled {
            info!(%today, "daily game counter reset");
        }
        rolled
    }

    pub async fn waiting_ticket(&self) -> Option<WaitingTicket> {
        self.state.lock().await.matchmaker.waiting().cloned()
    }

    pub async fn active_matches(&self) -> usize {
        self.state.lock().await.matches.len()
    }
}

// Clear membership for both seats and build the survivor's notification.
fn finish_match(registry: &mut ConnectionRegistry, completion: Completion) -> Option<Delivery> {
    let Completion {
        game,
        recipient,
        outcome,
    } = completion;
    registry.clear_match(game.white.conn_id, &game.match_id);
    registry.clear_match(game.black.conn_id, &game.match_id);

    let outbox = registry.outbox(recipient)?;
    Some((outbox, game_over_event(game.match_id, outcome)))
}

fn game_over_event(match_id: String, outcome: GameOutcome) -> LobbyEvent {
    LobbyEvent::GameOver { match_id, outcome }
}

// Fire-and-forget: a slow receiver loses the event instead of stalling the caller.
fn deliver(outbox: &mpsc::Sender<LobbyEvent>, event: LobbyEvent) {
    match outbox.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(event)) => {
            warn!(kind = event.kind(), "outbound queue full; dropping event");
        }
        Err(mpsc::error::TrySendError::Closed(event)) => {
            debug!(kind = event.kind(), "outbound queue closed; dropping event");
        }
    }
}
