use crate::domain::ConnectionId;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{Lobby, LobbyEvent, SearchOutcome};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    Ws(axum::Error),
    Serialization(serde_json::Error),
    OutboxClosed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Ws(err) => write!(f, "websocket error: {err}"),
            NetError::Serialization(err) => write!(f, "serialization error: {err}"),
            NetError::OutboxClosed => write!(f, "outbound queue closed"),
        }
    }
}

impl std::error::Error for NetError {}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_DISPLAY_NAME_LEN: usize = 32;
const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let lobby = state.lobby.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, lobby))
}

async fn handle_socket(mut socket: WebSocket, lobby: Arc<Lobby>) {
    // Admission happens before the first await on the socket so stats count us immediately.
    let (conn_id, outbox_rx) = lobby.admit().await;
    let span = info_span!("conn", conn_id = conn_id.0);

    async move {
        info!("client connected");
        let mut ctx = ConnCtx::new(conn_id, lobby, outbox_rx);

        // Main Client Loop
        if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
            warn!(error = %e, "client loop exited with error");
        }
    }
    .instrument(span)
    .await;
}

struct ConnCtx {
    pub conn_id: ConnectionId,
    pub lobby: Arc<Lobby>,
    // Events queued by the lobby for this connection.
    pub outbox_rx: mpsc::Receiver<LobbyEvent>,
    // Last display name this connection searched with.
    pub display_name: Option<String>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,
    pub dropped_relays: u64,

    pub last_invalid_input_log: Instant,
    pub last_dropped_relay_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(conn_id: ConnectionId, lobby: Arc<Lobby>, outbox_rx: mpsc::Receiver<LobbyEvent>) -> Self {
        let now = Instant::now() - LOG_THROTTLE;
        Self {
            conn_id,
            lobby,
            outbox_rx,
            display_name: None,

            msgs_in: 0,
            msgs_out: 0,
            bytes_in: 0,
            bytes_out: 0,

            invalid_json: 0,
            dropped_relays: 0,

            last_invalid_input_log: now,
            last_dropped_relay_log: now,

            close_frame: None,
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

// Trim the client-supplied name; empty or oversized names fall back to the default.
fn sanitize_display_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_DISPLAY_NAME_LEN {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        name.to_string()
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx).await {
                    LoopControl::Continue => false,
                    LoopControl::Disconnect => true,
                }
            }

            // Outgoing lobby events queued for this connection
            event = ctx.outbox_rx.recv() => {
                match event {
                    Some(event) => match forward_event(socket, event, ctx).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    None => {
                        fatal = Some(NetError::OutboxClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = %err, "socket close error");
            }
            break;
        }
    }

    disconnect_cleanup(ctx).await;

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> LoopControl {
    let conn_id = ctx.conn_id;
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => {
                        dispatch_client_message(message, ctx).await;
                        LoopControl::Continue
                    }
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_input_log) {
                            warn!(
                                %conn_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return LoopControl::Disconnect;
                        }

                        LoopControl::Continue
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                LoopControl::Disconnect
            }
            Message::Ping(_) | Message::Pong(_) => LoopControl::Continue,
            Message::Close(_) => LoopControl::Disconnect,
        },
        Some(Err(e)) => {
            warn!(%conn_id, error = %e, "websocket recv error");
            LoopControl::Disconnect
        }
        None => {
            info!(%conn_id, "websocket closed");
            LoopControl::Disconnect
        }
    }
}

// One arm per client message; misuse is logged and never answered.
async fn dispatch_client_message(message: ClientMessage, ctx: &mut ConnCtx) {
    let conn_id = ctx.conn_id;
    match message {
        ClientMessage::SearchGame(payload) => {
            let requested = payload.map(|p| p.username).unwrap_or_default();
            let name = sanitize_display_name(&requested);
            ctx.display_name = Some(name.clone());
            match ctx.lobby.request_match(conn_id, name).await {
                SearchOutcome::Waiting => info!(%conn_id, "searching for opponent"),
                SearchOutcome::Matched { match_id } => debug!(%conn_id, %match_id, "paired"),
                outcome @ (SearchOutcome::AlreadyWaiting
                | SearchOutcome::InMatch
                | SearchOutcome::UnknownConnection) => {
                    debug!(%conn_id, ?outcome, "search ignored");
                }
            }
        }
        ClientMessage::CancelSearch => {
            if ctx.lobby.cancel_search(conn_id).await {
                info!(%conn_id, "search cancelled");
            }
        }
        ClientMessage::MakeMove(payload) => {
            let (match_id, payload) = payload.into_parts();
            if let Err(err) = ctx.lobby.relay_move(&match_id, conn_id, payload).await {
                note_dropped_relay(ctx, &match_id, "move", &err);
            }
        }
        ClientMessage::GameOver(payload) => {
            if let Err(err) = ctx
                .lobby
                .report_game_over(&payload.game_id, conn_id, payload.winner.into())
                .await
            {
                note_dropped_relay(ctx, &payload.game_id, "game over", &err);
            }
        }
    }
}

fn note_dropped_relay(ctx: &mut ConnCtx, match_id: &str, what: &str, err: &dyn std::error::Error) {
    ctx.dropped_relays += 1;
    if should_log(&mut ctx.last_dropped_relay_log) {
        debug!(conn_id = %ctx.conn_id, %match_id, error = %err, "dropping {what}");
    }
}

async fn forward_event(socket: &mut WebSocket, event: LobbyEvent, ctx: &mut ConnCtx) -> LoopControl {
    let kind = event.kind();
    match send_message(socket, &ServerMessage::from(event)).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = %err, kind, "failed to send lobby event");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) {
    // Releases the waiting ticket and ends any active match for the opponent.
    ctx.lobby.remove(ctx.conn_id).await;

    debug!(
        conn_id = %ctx.conn_id,
        display_name = ctx.display_name.as_deref().unwrap_or(""),
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        dropped_relays = ctx.dropped_relays,
        "connection stats"
    );
    info!(conn_id = %ctx.conn_id, "client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_name_is_padded_then_it_is_trimmed() {
        assert_eq!(sanitize_display_name("  Ana  "), "Ana");
    }

    #[test]
    fn when_name_is_blank_then_default_is_used() {
        assert_eq!(sanitize_display_name("   "), DEFAULT_DISPLAY_NAME);
    }

    #[test]
    fn when_name_is_too_long_then_default_is_used() {
        let long = "x".repeat(MAX_DISPLAY_NAME_LEN + 1);
        assert_eq!(sanitize_display_name(&long), DEFAULT_DISPLAY_NAME);

        let exact = "y".repeat(MAX_DISPLAY_NAME_LEN);
        assert_eq!(sanitize_display_name(&exact), exact);
    }
}
