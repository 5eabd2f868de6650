// Live connection bookkeeping: outbound queues and match membership.

use crate::domain::ConnectionId;
use crate::use_cases::LobbyEvent;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Per-connection record owned by the registry.
#[derive(Debug)]
pub struct ConnectionEntry {
    /// Outbound queue drained by the connection's socket task.
    pub outbox: mpsc::Sender<LobbyEvent>,
    /// Active match the connection is seated in, if any.
    pub match_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: u64,
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection and returns its freshly allocated identifier.
    pub fn admit(&mut self, outbox: mpsc::Sender<LobbyEvent>) -> ConnectionId {
        self.next_id += 1;
        let conn_id = ConnectionId(self.next_id);
        self.connections.insert(
            conn_id,
            ConnectionEntry {
                outbox,
                match_id: None,
            },
        );
        conn_id
    }

    /// Drops a connection; unknown identifiers are a no-op.
    pub fn remove(&mut self, conn_id: ConnectionId) -> Option<ConnectionEntry> {
        self.connections.remove(&conn_id)
    }

    pub fn count(&self) -> usize {
        self.connections.len()
    }

    pub fn contains(&self, conn_id: ConnectionId) -> bool {
        self.connections.contains_key(&conn_id)
    }

    pub fn outbox(&self, conn_id: ConnectionId) -> Option<mpsc::Sender<LobbyEvent>> {
        self.connections
            .get(&conn_id)
            .map(|entry| entry.outbox.clone())
    }

    /// Clones every outbound handle so fan-out can happen outside the lock.
    pub fn outboxes(&self) -> Vec<mpsc::Sender<LobbyEvent>> {
        self.connections
            .values()
            .map(|entry| entry.outbox.clone())
            .collect()
    }

    pub fn match_of(&self, conn_id: ConnectionId) -> Option<&str> {
        self.connections
            .get(&conn_id)
            .and_then(|entry| entry.match_id.as_deref())
    }

    pub fn set_match(&mut self, conn_id: ConnectionId, match_id: &str) {
        if let Some(entry) = self.connections.get_mut(&conn_id) {
            entry.match_id = Some(match_id.to_string());
        }
    }

    /// Clears membership only if the connection still points at `match_id`.
    pub fn clear_match(&mut self, conn_id: ConnectionId, match_id: &str) {
        if let Some(entry) = self.connections.get_mut(&conn_id) {
            if entry.match_id.as_deref() == Some(match_id) {
                entry.match_id = None;
            }
        }
    }
}
