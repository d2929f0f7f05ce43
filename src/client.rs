//! Async runtime for the Crisis Survival client.
//!
//! [`CrisisClient`] is a thin handle that forwards user intents to a background
//! session loop via an unbounded MPSC channel. The loop owns the
//! [`SessionMachine`], the open transport, the pending connect task and both
//! timers, and multiplexes them with `tokio::select!`. Render instructions are
//! emitted on a bounded channel returned from [`CrisisClient::start`].
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::new("ws://127.0.0.1:8000");
//! let (client, mut renders) = CrisisClient::start(WebSocketConnector, config);
//!
//! client.enter_name("Alice")?;
//! client.start_solo()?;
//!
//! while let Some(instruction) = renders.recv().await {
//!     match instruction {
//!         RenderInstruction::KeywordOptions { chosen: None, .. } => client.choose_keyword(0)?,
//!         RenderInstruction::Alert(diagnostic) => eprintln!("{diagnostic}"),
//!         _ => {}
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::codec;
use crate::error::{ClientError, Result};
use crate::input::{LinkEvent, UserIntent};
use crate::lifecycle::ConnectionId;
use crate::protocol::ClientMessage;
use crate::render::RenderInstruction;
use crate::session::{
    SessionMachine, SessionSettings, DEFAULT_MATCHING_COUNTDOWN, DEFAULT_PLAYER_NAME,
};
use crate::state::SessionView;
use crate::transport::{Connector, Transport};

/// Default capacity of the bounded render channel.
const DEFAULT_RENDER_CHANNEL_CAPACITY: usize = 256;

/// Default time allowed for a transport to open.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Period of the matching countdown.
const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`CrisisClient`].
///
/// The only required field is `server_url`; all others have defaults.
///
/// # Example
///
/// ```
/// use crisis_survival_client::client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("ws://127.0.0.1:8000")
///     .with_default_player_name("Guest")
///     .with_handshake_timeout(Duration::from_secs(3))
///     .with_render_channel_capacity(0);
/// assert_eq!(config.server_url, "ws://127.0.0.1:8000");
/// assert_eq!(config.render_channel_capacity, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the game server. Connections go to `{server_url}/ws/{name}`.
    pub server_url: String,
    /// Name used when the player leaves the name blank.
    ///
    /// Defaults to **"Anonymous"**.
    pub default_player_name: String,
    /// How long a connection attempt may take to open before it is abandoned
    /// and the player is told to retry.
    ///
    /// Defaults to **5 seconds**.
    pub handshake_timeout: Duration,
    /// Starting value of the cosmetic matching countdown, in seconds.
    ///
    /// Defaults to **30**.
    pub matching_countdown: u32,
    /// Capacity of the bounded render channel.
    ///
    /// When the view cannot keep up, instructions are dropped (with a warning
    /// logged) to avoid blocking the session loop. Connectivity alerts are
    /// always delivered and wait for room, pausing the loop until the view
    /// drains the channel.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub render_channel_capacity: usize,
    /// Timeout for the graceful shutdown. When it expires the session loop is
    /// aborted.
    ///
    /// Defaults to **1 second**.
    pub shutdown_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given server with default values.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            default_player_name: DEFAULT_PLAYER_NAME.to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            matching_countdown: DEFAULT_MATCHING_COUNTDOWN,
            render_channel_capacity: DEFAULT_RENDER_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Set the name used for a blank display name.
    #[must_use]
    pub fn with_default_player_name(mut self, name: impl Into<String>) -> Self {
        self.default_player_name = name.into();
        self
    }

    /// Set the handshake timeout.
    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Set the starting value of the matching countdown, in seconds.
    #[must_use]
    pub fn with_matching_countdown(mut self, seconds: u32) -> Self {
        self.matching_countdown = seconds;
        self
    }

    /// Set the capacity of the bounded render channel. Values below 1 are
    /// clamped to 1.
    #[must_use]
    pub fn with_render_channel_capacity(mut self, capacity: usize) -> Self {
        self.render_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            server_url: self.server_url.clone(),
            default_player_name: self.default_player_name.clone(),
            matching_countdown: self.matching_countdown,
        }
    }
}

// ── Client handle ───────────────────────────────────────────────────

/// Async handle for one player's Crisis Survival client.
///
/// Created via [`CrisisClient::start`], which spawns the background session
/// loop and returns this handle together with the render receiver.
///
/// Intent methods queue the intent and return immediately. An intent that is
/// not valid in the current state is dropped by the session loop; the methods
/// only fail once the loop has exited.
pub struct CrisisClient {
    intent_tx: mpsc::UnboundedSender<UserIntent>,
    view_rx: watch::Receiver<SessionView>,
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_timeout: Duration,
}

impl CrisisClient {
    /// Start the session loop and return a handle plus render receiver.
    ///
    /// No connection is opened until the player starts a session. The
    /// `connector` is shared across every connection attempt.
    ///
    /// # Back-pressure
    ///
    /// Ordinary instructions are dropped when the render channel is full, but
    /// [`RenderInstruction::Alert`] waits for room. While an alert waits, the
    /// loop processes nothing else and does not publish a new [`view`](Self::view).
    /// Drain the render receiver independently of [`subscribe`](Self::subscribe);
    /// a view that blocks on the watch channel before draining renders can
    /// stall the session.
    #[must_use = "the render receiver must be drained for the view to update"]
    pub fn start<C: Connector>(
        connector: C,
        config: ClientConfig,
    ) -> (Self, mpsc::Receiver<RenderInstruction>) {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.render_channel_capacity.max(1);
        let (render_tx, render_rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let machine = SessionMachine::new(config.session_settings());
        let (view_tx, view_rx) = watch::channel(machine.view().clone());
        let (link_tx, link_rx) = mpsc::unbounded_channel();

        let runtime = SessionRuntime {
            machine,
            connector: Arc::new(connector),
            link_tx,
            render_tx,
            view_tx,
            handshake_timeout: config.handshake_timeout,
            transport: None,
            pending: None,
            deadline: None,
            countdown: None,
        };
        let task = tokio::spawn(session_loop(runtime, intent_rx, link_rx, shutdown_rx));

        let client = Self {
            intent_tx,
            view_rx,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };
        (client, render_rx)
    }

    // ── Intents ─────────────────────────────────────────────────────

    /// Set the display name. Ignored while a connection is live.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn enter_name(&self, name: impl Into<String>) -> Result<()> {
        self.submit(UserIntent::EnterName(name.into()))
    }

    /// Connect and start a game against bots.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn start_solo(&self) -> Result<()> {
        self.submit(UserIntent::StartSolo)
    }

    /// Connect and join the matchmaking queue.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn start_matching(&self) -> Result<()> {
        self.submit(UserIntent::StartMatching)
    }

    /// Leave the matching screen and close the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn cancel_matching(&self) -> Result<()> {
        self.submit(UserIntent::CancelMatching)
    }

    /// Pick the keyword at `index` of the offered options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn choose_keyword(&self, index: usize) -> Result<()> {
        self.submit(UserIntent::ChooseKeyword(index))
    }

    /// Try to grab the item in slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn grab_item(&self, index: usize) -> Result<()> {
        self.submit(UserIntent::GrabItem(index))
    }

    /// Ask to leave the running game; raises a confirmation prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn request_exit(&self) -> Result<()> {
        self.submit(UserIntent::RequestExit)
    }

    /// Confirm a pending exit request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn confirm_exit(&self) -> Result<()> {
        self.submit(UserIntent::ConfirmExit)
    }

    /// Withdraw a pending exit request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn dismiss_exit(&self) -> Result<()> {
        self.submit(UserIntent::DismissExit)
    }

    /// Leave the finished game and return home.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the session loop has exited.
    pub fn play_again(&self) -> Result<()> {
        self.submit(UserIntent::PlayAgain)
    }

    // ── State accessors ─────────────────────────────────────────────

    /// Snapshot of the session as of the last processed input.
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// A receiver that is notified after every processed input.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Returns `true` while the session loop accepts intents.
    pub fn is_running(&self) -> bool {
        !self.intent_tx.is_closed()
    }

    /// Shut down the client, closing any connection and stopping the loop.
    ///
    /// After this returns the render receiver yields `None` once drained.
    pub async fn shutdown(&mut self) {
        debug!("CrisisClient: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("session loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("session loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("session loop aborted: {join_err}");
                    }
                }
            }
        }
    }

    fn submit(&self, intent: UserIntent) -> Result<()> {
        self.intent_tx
            .send(intent)
            .map_err(|_| ClientError::NotConnected)
    }
}

impl std::fmt::Debug for CrisisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let view = self.view_rx.borrow();
        f.debug_struct("CrisisClient")
            .field("screen", &view.screen)
            .field("link", &view.link)
            .field("running", &self.is_running())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for CrisisClient {
    fn drop(&mut self) {
        // Drop cannot await a graceful close; aborting drops the loop future,
        // which drops the transport and any pending connect task handle.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Session loop ────────────────────────────────────────────────────

/// Result of a spawned connect task, tagged with its attempt.
enum LinkReport<T> {
    Opened(ConnectionId, T),
    Failed(ConnectionId, ClientError),
}

/// Everything the session loop owns besides its input channels.
struct SessionRuntime<C: Connector> {
    machine: SessionMachine,
    connector: Arc<C>,
    link_tx: mpsc::UnboundedSender<LinkReport<C::Transport>>,
    render_tx: mpsc::Sender<RenderInstruction>,
    view_tx: watch::Sender<SessionView>,
    handshake_timeout: Duration,
    transport: Option<(ConnectionId, C::Transport)>,
    pending: Option<(ConnectionId, JoinHandle<()>)>,
    deadline: Option<(ConnectionId, Instant)>,
    countdown: Option<Interval>,
}

/// Background loop that feeds intents, transport traffic and timers into the
/// session machine, one input at a time.
///
/// Exits when the shutdown signal fires or the client handle is dropped.
async fn session_loop<C: Connector>(
    mut runtime: SessionRuntime<C>,
    mut intent_rx: mpsc::UnboundedReceiver<UserIntent>,
    mut link_rx: mpsc::UnboundedReceiver<LinkReport<C::Transport>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("session loop started");

    loop {
        tokio::select! {
            // Branch 1: user intent from the client handle
            intent = intent_rx.recv() => {
                match intent {
                    Some(intent) => {
                        debug!(?intent, "user intent");
                        let actions = runtime.machine.handle_intent(intent);
                        runtime.execute(actions).await;
                    }
                    None => {
                        debug!("intent channel closed, shutting down session loop");
                        break;
                    }
                }
            }

            // Branch 2: shutdown signal
            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                break;
            }

            // Branch 3: a connect task finished
            Some(report) = link_rx.recv() => {
                runtime.on_link_report(report).await;
            }

            // Branch 4: incoming message on the open transport
            (connection, incoming) = recv_open(&mut runtime.transport) => {
                runtime.on_incoming(connection, incoming).await;
            }

            // Branch 5: handshake deadline
            connection = deadline_elapsed(runtime.deadline) => {
                runtime.deadline = None;
                debug!(%connection, "handshake deadline passed");
                let actions = runtime.machine.handle_link(LinkEvent::HandshakeTimeout(connection));
                runtime.execute(actions).await;
            }

            // Branch 6: matching countdown
            () = countdown_tick(&mut runtime.countdown) => {
                let actions = runtime.machine.handle_link(LinkEvent::CountdownTick);
                runtime.execute(actions).await;
            }
        }
    }

    runtime.teardown().await;
    debug!("session loop exited");
}

async fn recv_open<T: Transport>(
    transport: &mut Option<(ConnectionId, T)>,
) -> (ConnectionId, Option<Result<String>>) {
    match transport {
        Some((connection, transport)) => (*connection, transport.recv().await),
        None => std::future::pending().await,
    }
}

async fn deadline_elapsed(deadline: Option<(ConnectionId, Instant)>) -> ConnectionId {
    match deadline {
        Some((connection, at)) => {
            tokio::time::sleep_until(at).await;
            connection
        }
        None => std::future::pending().await,
    }
}

async fn countdown_tick(countdown: &mut Option<Interval>) {
    match countdown {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl<C: Connector> SessionRuntime<C> {
    async fn on_link_report(&mut self, report: LinkReport<C::Transport>) {
        match report {
            LinkReport::Opened(connection, mut transport) => {
                self.settle_attempt(connection);
                let actions = self.machine.handle_link(LinkEvent::Opened(connection));
                if self.machine.lifecycle().state().live() == Some(connection)
                    && self.machine.lifecycle().is_open()
                {
                    self.transport = Some((connection, transport));
                } else if let Err(e) = transport.close().await {
                    debug!(%connection, "closing superseded transport failed: {e}");
                }
                self.execute(actions).await;
            }
            LinkReport::Failed(connection, e) => {
                self.settle_attempt(connection);
                warn!(%connection, "connect failed: {e}");
                let actions = self.machine.handle_link(LinkEvent::ConnectFailed(connection));
                self.execute(actions).await;
            }
        }
    }

    async fn on_incoming(&mut self, connection: ConnectionId, incoming: Option<Result<String>>) {
        match incoming {
            Some(Ok(text)) => match codec::decode(&text) {
                Ok(Some(event)) => {
                    let actions = self.machine.handle_event(event);
                    self.execute(actions).await;
                }
                Ok(None) => {}
                Err(e) => warn!(%connection, "dropping undecodable server message: {e}"),
            },
            Some(Err(e)) => {
                error!(%connection, "transport receive error: {e}");
                self.transport = None;
                let actions = self.machine.handle_link(LinkEvent::Closed(connection));
                self.execute(actions).await;
            }
            None => {
                info!(%connection, "transport closed by server");
                self.transport = None;
                let actions = self.machine.handle_link(LinkEvent::Closed(connection));
                self.execute(actions).await;
            }
        }
    }

    /// Forget the connect task and deadline of an attempt that has resolved.
    fn settle_attempt(&mut self, connection: ConnectionId) {
        if self.pending.as_ref().is_some_and(|(id, _)| *id == connection) {
            self.pending = None;
        }
        if self.deadline.is_some_and(|(id, _)| id == connection) {
            self.deadline = None;
        }
    }

    /// Carry out `actions` in order, including any the machine produces while
    /// reacting to a failed send, then publish the new view.
    async fn execute(&mut self, actions: Vec<Action>) {
        let mut queue = VecDeque::from(actions);
        while let Some(action) = queue.pop_front() {
            match action {
                Action::Connect { connection, url } => self.connect(connection, url),
                Action::Send(message) => {
                    if let Some(connection) = self.send(message).await {
                        let followup = self.machine.handle_link(LinkEvent::Closed(connection));
                        queue.extend(followup);
                    }
                }
                Action::Close { connection } => self.close(connection).await,
                Action::StartCountdown => {
                    let mut interval = tokio::time::interval_at(
                        Instant::now() + COUNTDOWN_PERIOD,
                        COUNTDOWN_PERIOD,
                    );
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.countdown = Some(interval);
                }
                Action::StopCountdown => self.countdown = None,
                Action::Render(instruction) => emit(&self.render_tx, instruction).await,
            }
        }
        self.view_tx.send_replace(self.machine.view().clone());
    }

    fn connect(&mut self, connection: ConnectionId, url: String) {
        if let Some((previous, handle)) = self.pending.take() {
            debug!(connection = %previous, "aborting superseded connect");
            handle.abort();
        }
        info!(%connection, %url, "connecting");

        let connector = Arc::clone(&self.connector);
        let link_tx = self.link_tx.clone();
        let handle = tokio::spawn(async move {
            let report = match connector.connect(&url).await {
                Ok(transport) => LinkReport::Opened(connection, transport),
                Err(e) => LinkReport::Failed(connection, e),
            };
            let _ = link_tx.send(report);
        });

        self.pending = Some((connection, handle));
        self.deadline = Some((connection, Instant::now() + self.handshake_timeout));
    }

    /// Send one message on the open transport. Returns the connection if the
    /// send failed and the transport was dropped.
    async fn send(&mut self, message: ClientMessage) -> Option<ConnectionId> {
        let Some((connection, transport)) = self.transport.as_mut() else {
            debug!(tag = message.tag(), "no open transport, dropping message");
            return None;
        };
        let connection = *connection;
        let json = match codec::encode(&message) {
            Ok(json) => json,
            Err(e) => {
                error!(tag = message.tag(), "failed to serialize client message: {e}");
                return None;
            }
        };
        debug!(%connection, tag = message.tag(), "sending client message");
        match transport.send(json).await {
            Ok(()) => None,
            Err(e) => {
                error!(%connection, "transport send error: {e}");
                self.transport = None;
                Some(connection)
            }
        }
    }

    async fn close(&mut self, connection: ConnectionId) {
        if self.pending.as_ref().is_some_and(|(id, _)| *id == connection) {
            if let Some((_, handle)) = self.pending.take() {
                handle.abort();
            }
        }
        if self.deadline.is_some_and(|(id, _)| id == connection) {
            self.deadline = None;
        }
        if self.transport.as_ref().is_some_and(|(id, _)| *id == connection) {
            if let Some((_, mut transport)) = self.transport.take() {
                if let Err(e) = transport.close().await {
                    debug!(%connection, "transport close failed: {e}");
                }
                info!(%connection, "connection closed");
            }
        }
    }

    async fn teardown(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            handle.abort();
        }
        self.deadline = None;
        self.countdown = None;
        if let Some((connection, mut transport)) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!(%connection, "transport close failed: {e}");
            }
        }
    }
}

/// Emit a render instruction. If the channel is full, log a warning and drop
/// it, except for alerts, which always wait for room.
async fn emit(render_tx: &mpsc::Sender<RenderInstruction>, instruction: RenderInstruction) {
    if matches!(instruction, RenderInstruction::Alert(_)) {
        if render_tx.send(instruction).await.is_err() {
            debug!("render channel closed, receiver dropped");
        }
        return;
    }
    match render_tx.try_send(instruction) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(?dropped, "render channel full, dropping instruction");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("render channel closed, receiver dropped");
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::state::Screen;
    use async_trait::async_trait;

    /// A connector whose connects never resolve.
    struct StalledConnector;

    struct NeverTransport;

    #[async_trait]
    impl Transport for NeverTransport {
        async fn send(&mut self, _message: String) -> Result<()> {
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<String>> {
            std::future::pending().await
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Connector for StalledConnector {
        type Transport = NeverTransport;

        async fn connect(&self, _url: &str) -> Result<NeverTransport> {
            std::future::pending().await
        }
    }

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("ws://localhost:8000");
        assert_eq!(config.default_player_name, "Anonymous");
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
        assert_eq!(config.matching_countdown, 30);
        assert_eq!(config.render_channel_capacity, 256);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[test]
    fn config_clamps_channel_capacity() {
        let config = ClientConfig::new("ws://h").with_render_channel_capacity(0);
        assert_eq!(config.render_channel_capacity, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_connect_times_out_with_alert() {
        let (mut client, mut renders) =
            CrisisClient::start(StalledConnector, ClientConfig::new("ws://h"));
        client.start_solo().unwrap();

        let alert = loop {
            match renders.recv().await.unwrap() {
                RenderInstruction::Alert(diagnostic) => break diagnostic,
                _ => continue,
            }
        };
        assert_eq!(alert, crate::diagnostic::Diagnostic::HandshakeTimeout);

        let mut views = client.subscribe();
        let view = views
            .wait_for(|view| view.screen == Screen::Home)
            .await
            .unwrap()
            .clone();
        assert!(view.home_hint.is_some());

        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn alert_waits_for_room_in_full_render_channel() {
        let config = ClientConfig::new("ws://h").with_render_channel_capacity(1);
        let (mut client, mut renders) = CrisisClient::start(StalledConnector, config);
        client.start_solo().unwrap();

        // The deadline passes while the channel still holds the first
        // instruction of the start.
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(renders.recv().await.unwrap(), RenderInstruction::HomeHint(None));
        assert_eq!(
            renders.recv().await.unwrap(),
            RenderInstruction::Alert(crate::diagnostic::Diagnostic::HandshakeTimeout)
        );
        let mut views = client.subscribe();
        views
            .wait_for(|view| view.screen == Screen::Home)
            .await
            .unwrap();

        client.shutdown().await;
    }

    #[tokio::test]
    async fn intents_fail_after_shutdown() {
        let (mut client, _renders) =
            CrisisClient::start(StalledConnector, ClientConfig::new("ws://h"));
        assert!(client.is_running());
        client.shutdown().await;
        assert!(matches!(client.start_solo(), Err(ClientError::NotConnected)));
    }
}
