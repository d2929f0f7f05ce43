#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for Crisis Survival client integration tests.
//!
//! Provides a scripted [`MockConnector`], a channel-based [`MockTransport`]
//! whose far end is a [`MockServer`], helpers for driving a bare
//! [`SessionMachine`], and builders for the server's JSON messages.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use crisis_survival_client::{
    Action, ClientError, ClientMessage, ConnectionId, Connector, LinkEvent, SessionMachine,
    SessionSettings, Transport, UserIntent,
};
use serde_json::json;
use tokio::sync::mpsc;

// ── MockTransport ───────────────────────────────────────────────────

/// A channel-based mock transport for integration testing.
///
/// Every message the client sends is forwarded to the paired [`MockServer`];
/// everything the server pushes is yielded by `recv()`. Dropping the server's
/// sender closes the connection from the far side.
pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<Result<String, ClientError>>,
    outgoing: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

/// The server side of a [`MockTransport`].
pub struct MockServer {
    to_client: Option<mpsc::UnboundedSender<Result<String, ClientError>>>,
    from_client: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

/// Create a connected transport/server pair.
pub fn mock_pair() -> (MockTransport, MockServer) {
    let (to_client, incoming) = mpsc::unbounded_channel();
    let (outgoing, from_client) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));
    let transport = MockTransport {
        incoming,
        outgoing,
        closed: Arc::clone(&closed),
    };
    let server = MockServer {
        to_client: Some(to_client),
        from_client,
        closed,
    };
    (transport, server)
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), ClientError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ClientError::TransportClosed);
        }
        self.outgoing
            .send(message)
            .map_err(|_| ClientError::TransportSend("server gone".into()))
    }

    async fn recv(&mut self) -> Option<Result<String, ClientError>> {
        self.incoming.recv().await
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl MockServer {
    /// Push one raw text message to the client.
    pub fn push(&self, text: impl Into<String>) {
        if let Some(tx) = &self.to_client {
            let _ = tx.send(Ok(text.into()));
        }
    }

    /// Push a transport-level receive error to the client.
    pub fn fail(&self) {
        if let Some(tx) = &self.to_client {
            let _ = tx.send(Err(ClientError::TransportReceive("connection reset".into())));
        }
    }

    /// Make every later client `send` fail while the inbound side stays up.
    pub fn reject_sends(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Close the connection from the server side.
    pub fn hang_up(&mut self) {
        self.to_client = None;
    }

    /// Wait for the next message the client sends, decoded.
    pub async fn next_message(&mut self) -> ClientMessage {
        let text = self
            .from_client
            .recv()
            .await
            .expect("client transport dropped before sending");
        serde_json::from_str(&text).expect("client sent invalid JSON")
    }

    /// Messages the client has sent that have not been read yet.
    pub fn drain_messages(&mut self) -> Vec<ClientMessage> {
        let mut messages = Vec::new();
        while let Ok(text) = self.from_client.try_recv() {
            messages.push(serde_json::from_str(&text).expect("client sent invalid JSON"));
        }
        messages
    }

    /// Whether the client closed its end.
    pub fn client_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// What the next connect attempt does.
pub enum ConnectScript {
    /// Open successfully with this transport.
    Accept(MockTransport),
    /// Fail immediately.
    Refuse,
    /// Never resolve.
    Hang,
}

/// A connector that replays scripted outcomes in order and records every URL.
///
/// Once the script runs out, further connects hang.
#[derive(Clone)]
pub struct MockConnector {
    script: Arc<StdMutex<VecDeque<ConnectScript>>>,
    pub urls: Arc<StdMutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(script: Vec<ConnectScript>) -> Self {
        Self {
            script: Arc::new(StdMutex::new(VecDeque::from(script))),
            urls: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    /// A connector that accepts one connection; returns the server side.
    pub fn accepting() -> (Self, MockServer) {
        let (transport, server) = mock_pair();
        (Self::new(vec![ConnectScript::Accept(transport)]), server)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, url: &str) -> Result<MockTransport, ClientError> {
        self.urls.lock().unwrap().push(url.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(ConnectScript::Accept(transport)) => Ok(transport),
            Some(ConnectScript::Refuse) => Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Some(ConnectScript::Hang) | None => std::future::pending().await,
        }
    }
}

// ── SessionMachine helpers ──────────────────────────────────────────

pub fn machine() -> SessionMachine {
    SessionMachine::new(SessionSettings::new("ws://127.0.0.1:8000"))
}

/// The connection a start intent asked the runtime to open.
pub fn connect_id(actions: &[Action]) -> ConnectionId {
    actions
        .iter()
        .find_map(|action| match action {
            Action::Connect { connection, .. } => Some(*connection),
            _ => None,
        })
        .expect("expected a Connect action")
}

/// Messages an action list asks the runtime to send.
pub fn sent(actions: &[Action]) -> Vec<ClientMessage> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::Send(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Feed a raw wire message through the decoder into the machine.
pub fn deliver(machine: &mut SessionMachine, json: &str) -> Vec<Action> {
    match crisis_survival_client::codec::decode(json).expect("fixture must decode") {
        Some(event) => machine.handle_event(event),
        None => Vec::new(),
    }
}

/// Start a session in the given mode and open its connection.
pub fn open_session(machine: &mut SessionMachine, intent: UserIntent) -> ConnectionId {
    let connection = connect_id(&machine.handle_intent(intent));
    machine.handle_link(LinkEvent::Opened(connection));
    connection
}

/// A solo session for `name` that has reached the game screen with the
/// given roster (the local player first, then bots).
pub fn game_in_progress(name: &str, bots: &[&str]) -> (SessionMachine, ConnectionId) {
    let mut machine = machine();
    machine.handle_intent(UserIntent::EnterName(name.into()));
    let connection = open_session(&mut machine, UserIntent::StartSolo);
    deliver(&mut machine, &connected_json("p1"));
    let mut players = vec![(name, false)];
    players.extend(bots.iter().map(|bot| (*bot, true)));
    deliver(&mut machine, &game_starting_json(&players));
    (machine, connection)
}

// ── JSON helper functions ───────────────────────────────────────────

pub fn connected_json(player_id: &str) -> String {
    json!({"type": "connected", "player_id": player_id, "message": "Welcome!"}).to_string()
}

pub fn matching_started_json(queue_size: u32) -> String {
    json!({"type": "matching_started", "queue_size": queue_size}).to_string()
}

pub fn matching_cancelled_json() -> String {
    json!({"type": "matching_cancelled"}).to_string()
}

pub fn game_starting_json(players: &[(&str, bool)]) -> String {
    let players: Vec<_> = players
        .iter()
        .map(|(name, is_bot)| json!({"name": name, "is_bot": is_bot}))
        .collect();
    json!({"type": "game_starting", "players": players, "room_id": "room-1"}).to_string()
}

pub fn round_start_json(round: u32, max_rounds: u32) -> String {
    json!({"type": "round_start", "round": round, "max_rounds": max_rounds}).to_string()
}

pub fn phase_json(phase: &str) -> String {
    json!({"type": "phase_change", "phase": phase}).to_string()
}

pub fn scavenge_json(items: &[(&str, &str)]) -> String {
    let items: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(index, (name, tier))| json!({"index": index, "name": name, "tier": tier}))
        .collect();
    json!({"type": "phase_change", "phase": "scavenge", "items": items}).to_string()
}

pub fn keyword_options_json(options: &[&str]) -> String {
    json!({"type": "keyword_options", "options": options}).to_string()
}

pub fn crisis_revealed_json(name: &str) -> String {
    json!({
        "type": "crisis_revealed",
        "name": name,
        "scenario": "The city floods overnight.",
        "keywords": ["flood", "zombie"],
    })
    .to_string()
}

pub fn item_grabbed_json(index: usize, player: &str, item_name: &str) -> String {
    json!({
        "type": "item_grabbed",
        "item_index": index,
        "player": player,
        "item_name": item_name,
        "comment": "Handy!",
        "tier": "normal",
    })
    .to_string()
}

pub fn judgment_result_json(player: &str, survived: bool) -> String {
    json!({
        "type": "judgment_result",
        "player": player,
        "survived": survived,
        "item": "Rope",
        "story": "Against all odds.",
    })
    .to_string()
}

pub fn round_end_json(round: u32, scores: &[(&str, i64)]) -> String {
    let scores: Vec<_> = scores
        .iter()
        .map(|(name, score)| json!({"name": name, "score": score}))
        .collect();
    json!({"type": "round_end", "round": round, "scores": scores}).to_string()
}

pub fn player_left_json(player: &str) -> String {
    json!({
        "type": "player_left",
        "player": player,
        "message": format!("{player} left, a bot takes over"),
    })
    .to_string()
}

pub fn game_over_json(rankings: &[(&str, i64, bool)], tiebreaker: Option<&str>) -> String {
    let rankings: Vec<_> = rankings
        .iter()
        .map(|(name, score, is_bot)| json!({"name": name, "score": score, "is_bot": is_bot}))
        .collect();
    json!({"type": "game_over", "rankings": rankings, "tiebreaker_reason": tiebreaker})
        .to_string()
}
