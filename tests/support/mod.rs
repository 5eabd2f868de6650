// Shared helpers for booting a lobby server and driving WebSocket clients.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use lobby_server::use_cases::LobbySettings;
use serde_json::Value;
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, protocol::CloseFrame},
};

// Upper bound for any single expected message.
const RECV_TIMEOUT: Duration = Duration::from_secs(3);
// Poll cadence while waiting on lobby state over HTTP.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

// Settings with a broadcast interval long enough that stats never interleave by accident.
pub fn quiet_settings() -> LobbySettings {
    settings_with_stats_interval(Duration::from_secs(3600))
}

pub fn settings_with_stats_interval(stats_interval: Duration) -> LobbySettings {
    LobbySettings {
        wait_sample_capacity: 20,
        outbox_capacity: 64,
        opponent_elo: 1200,
        stats_interval,
        daily_reset_check_interval: Duration::from_secs(60),
    }
}

// Boot a fresh server on an ephemeral port so tests never share lobby state.
pub async fn spawn_server(settings: LobbySettings) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        lobby_server::serve(listener, settings)
            .await
            .expect("server failed");
    });
    addr
}

pub async fn fetch_stats(addr: SocketAddr) -> Value {
    reqwest::get(format!("http://{addr}/stats"))
        .await
        .expect("stats request should succeed")
        .json::<Value>()
        .await
        .expect("stats body should be json")
}

// Poll /stats until the waiting slot is (or is not) occupied.
pub async fn wait_for_searching(addr: SocketAddr, searching: bool) {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    loop {
        if fetch_stats(addr).await["searching"] == searching {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "lobby never reported searching == {searching}"
        );
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let (ws, _response) = connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("websocket handshake should succeed");
        Self { ws }
    }

    pub async fn send(&mut self, message: Value) {
        self.send_text(message.to_string()).await;
    }

    pub async fn send_text(&mut self, text: String) {
        self.ws
            .send(Message::Text(text.into()))
            .await
            .expect("send should succeed");
    }

    pub async fn send_binary(&mut self, bytes: Vec<u8>) {
        self.ws
            .send(Message::Binary(bytes.into()))
            .await
            .expect("send should succeed");
    }

    pub async fn search(&mut self, username: &str) {
        self.send(serde_json::json!({"type": "SEARCH_GAME", "data": {"username": username}}))
            .await;
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }

    // Next JSON message of any type, or None if the timeout elapses first.
    async fn next_json(&mut self, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.ws.next()).await.ok()??;
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(&text).expect("server sends json"));
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
    }

    // Next message that is not a periodic LOBBY_STATS broadcast.
    pub async fn recv(&mut self) -> Value {
        loop {
            let message = self
                .next_json(RECV_TIMEOUT)
                .await
                .expect("expected a server message before timeout");
            if message["type"] != "LOBBY_STATS" {
                return message;
            }
        }
    }

    pub async fn recv_stats(&mut self) -> Value {
        loop {
            let message = self
                .next_json(RECV_TIMEOUT)
                .await
                .expect("expected a stats broadcast before timeout");
            if message["type"] == "LOBBY_STATS" {
                return message;
            }
        }
    }

    // Asserts that nothing but stats arrives within `wait`.
    pub async fn expect_silence(&mut self, wait: Duration) {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return;
            }
            match self.next_json(remaining).await {
                Some(message) if message["type"] == "LOBBY_STATS" => continue,
                Some(message) => panic!("expected silence, got {message}"),
                None => return,
            }
        }
    }

    // Reads until the server closes the socket and returns its close frame.
    pub async fn recv_close(&mut self) -> Option<CloseFrame> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("expected the server to close before timeout")?;
            match frame {
                Ok(Message::Close(frame)) => return frame,
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

// Pair two fresh clients; the first one is guaranteed to search first.
pub async fn paired_clients(addr: SocketAddr) -> (TestClient, TestClient, String) {
    let mut white = TestClient::connect(addr).await;
    let mut black = TestClient::connect(addr).await;

    white.search("alice").await;
    wait_for_searching(addr, true).await;
    black.search("bob").await;

    let found = white.recv().await;
    assert_eq!(found["type"], "GAME_FOUND");
    let game_id = found["data"]["gameId"]
        .as_str()
        .expect("gameId should be a string")
        .to_string();
    let other = black.recv().await;
    assert_eq!(other["data"]["gameId"], game_id.as_str());
    (white, black, game_id)
}
