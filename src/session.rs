//! The session state machine.
//!
//! [`SessionMachine`] owns one player's view of one session: which screen is
//! up, which phase panel is showing, the roster, the current round, and the
//! connection lifecycle that gates all of it. It is a pure state machine. It
//! consumes [`ServerEvent`]s, [`UserIntent`]s and [`LinkEvent`]s and returns the
//! [`Action`]s the runtime must perform. No I/O and no clock, so every
//! transition can be driven directly from tests.
//!
//! # Event validity
//!
//! A server event is applied only when it makes sense on the current screen:
//!
//! | Screen     | Accepted events                                                        |
//! |------------|------------------------------------------------------------------------|
//! | `Home`     | none                                                                   |
//! | `Matching` | `connected`, `matching_started`, `matching_cancelled`, `game_starting` |
//! | `Game`     | everything else                                                        |
//!
//! Anything outside this table is a stale event and is dropped with a debug log.

use tracing::{debug, info, warn};

use crate::action::Action;
use crate::diagnostic::Diagnostic;
use crate::input::{LinkEvent, UserIntent};
use crate::lifecycle::{CloseKind, ConnectionId, ConnectionLifecycle};
use crate::protocol::{ClientMessage, ItemInfo, Phase, PlayerSummary, ServerEvent};
use crate::render::RenderInstruction;
use crate::state::{
    Commentary, Crisis, FinalStandings, GameView, ItemSlot, JudgmentOutcome, KeywordPick, Mode,
    RosterEntry, Screen, SessionView,
};

/// Default display name when the player leaves the name field blank.
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// Default length of the cosmetic matching countdown, in seconds.
pub const DEFAULT_MATCHING_COUNTDOWN: u32 = 30;

/// Static inputs the machine needs to open connections.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Base URL of the game server, e.g. `ws://127.0.0.1:8000`.
    pub server_url: String,
    /// Name used when the entered display name is blank.
    pub default_player_name: String,
    /// Starting value of the matching countdown, in seconds.
    pub matching_countdown: u32,
}

impl SessionSettings {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            default_player_name: DEFAULT_PLAYER_NAME.to_string(),
            matching_countdown: DEFAULT_MATCHING_COUNTDOWN,
        }
    }
}

/// Build the connection URL for `name`: `{server_url}/ws/{name}` with the name
/// percent-encoded as a single path segment.
pub fn connection_url(server_url: &str, name: &str) -> String {
    let mut url = format!("{}/ws/", server_url.trim_end_matches('/'));
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            url.push(char::from(byte));
        } else {
            url.push_str(&format!("%{byte:02X}"));
        }
    }
    url
}

/// Session state machine. See the [module documentation](self).
#[derive(Debug, Clone)]
pub struct SessionMachine {
    settings: SessionSettings,
    lifecycle: ConnectionLifecycle,
    view: SessionView,
}

impl SessionMachine {
    /// A machine on the home screen with no connection.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            lifecycle: ConnectionLifecycle::new(),
            view: SessionView::default(),
        }
    }

    /// Current client-visible state.
    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// Current connection lifecycle.
    pub fn lifecycle(&self) -> &ConnectionLifecycle {
        &self.lifecycle
    }

    /// Apply a user intent.
    pub fn handle_intent(&mut self, intent: UserIntent) -> Vec<Action> {
        let mut actions = Vec::new();
        match intent {
            UserIntent::EnterName(name) => self.enter_name(name),
            UserIntent::StartSolo => self.start(Mode::Solo, &mut actions),
            UserIntent::StartMatching => self.start(Mode::Multiplayer, &mut actions),
            UserIntent::CancelMatching => self.cancel_matching(&mut actions),
            UserIntent::ChooseKeyword(index) => self.choose_keyword(index, &mut actions),
            UserIntent::GrabItem(index) => self.grab_item(index, &mut actions),
            UserIntent::RequestExit => self.request_exit(&mut actions),
            UserIntent::ConfirmExit => self.confirm_exit(&mut actions),
            UserIntent::DismissExit => self.dismiss_exit(&mut actions),
            UserIntent::PlayAgain => self.play_again(&mut actions),
        }
        self.sync_link();
        actions
    }

    /// Apply a connection or timer notification from the runtime.
    pub fn handle_link(&mut self, event: LinkEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        match event {
            LinkEvent::Opened(connection) => {
                if self.lifecycle.on_open(connection) {
                    info!(%connection, "connection open");
                } else {
                    debug!(%connection, "late open for superseded connection");
                    actions.push(Action::Close { connection });
                }
            }
            LinkEvent::ConnectFailed(connection) => {
                self.on_closed(connection, Diagnostic::ConnectFailed, &mut actions);
            }
            LinkEvent::Closed(connection) => {
                self.on_closed(connection, Diagnostic::UnintentionalDisconnect, &mut actions);
            }
            LinkEvent::HandshakeTimeout(connection) => {
                if self.lifecycle.on_handshake_timeout(connection) {
                    actions.push(Action::Close { connection });
                    self.surface(Diagnostic::HandshakeTimeout, &mut actions);
                } else {
                    debug!(%connection, "handshake deadline for settled connection");
                }
            }
            LinkEvent::CountdownTick => self.countdown_tick(&mut actions),
        }
        self.sync_link();
        actions
    }

    /// Apply one decoded server event, in delivery order.
    pub fn handle_event(&mut self, event: ServerEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.accepts(&event) {
            debug!(tag = event.tag(), screen = ?self.view.screen, "ignoring stale server event");
            return actions;
        }

        match event {
            ServerEvent::Connected { player_id, message } => {
                self.on_connected(player_id, message, &mut actions);
            }
            ServerEvent::MatchingStarted { queue_size } => {
                self.view.queue_size = Some(queue_size);
                actions.push(RenderInstruction::QueueSize(queue_size).into());
            }
            ServerEvent::MatchingCancelled => {
                if let Some(connection) = self.lifecycle.close_intentionally() {
                    actions.push(Action::Close { connection });
                }
                self.go_home(&mut actions);
            }
            ServerEvent::GameStarting { players, room_id } => {
                self.on_game_starting(players, room_id, &mut actions);
            }
            ServerEvent::RoundStart { round, max_rounds } => {
                self.on_round_start(round, max_rounds, &mut actions);
            }
            ServerEvent::PhaseChange { phase, items } => {
                self.on_phase_change(phase, items, &mut actions);
            }
            ServerEvent::KeywordOptions { options } => {
                if let Some(game) = self.view.game.as_mut() {
                    game.round.keywords = KeywordPick {
                        options,
                        chosen: None,
                    };
                    actions.push(keyword_render(&game.round.keywords));
                }
            }
            ServerEvent::KeywordSubmitted { player } => {
                actions.push(RenderInstruction::Log(format!("{player} picked a keyword")).into());
                actions.push(narrate("Waiting for the other players to choose..."));
            }
            ServerEvent::GeneratingCrisis => {
                actions.push(RenderInstruction::PhaseLabel("Fusing the crisis...".into()).into());
                actions.push(narrate(
                    "The AI is fusing your choices into one desperate crisis...",
                ));
            }
            ServerEvent::CrisisRevealed {
                name,
                scenario,
                keywords,
            } => {
                if let Some(game) = self.view.game.as_mut() {
                    let crisis = Crisis {
                        name,
                        scenario,
                        keywords,
                    };
                    game.phase = Some(Phase::CrisisReveal);
                    actions.push(RenderInstruction::Phase(game.phase).into());
                    actions.push(RenderInstruction::Log(format!("Crisis: {}", crisis.name)).into());
                    actions.push(RenderInstruction::Crisis(crisis.clone()).into());
                    actions.push(narrate("The crisis is here! Get ready to scavenge..."));
                    game.round.crisis = Some(crisis);
                }
            }
            ServerEvent::ItemGrabbed {
                item_index,
                player,
                item_name,
                comment,
                ..
            } => {
                self.on_item_grabbed(item_index, player, item_name, comment, &mut actions);
            }
            ServerEvent::GrabFailed { message } => {
                actions.push(RenderInstruction::Log(message).into());
            }
            ServerEvent::Judging => {
                actions.push(RenderInstruction::PhaseLabel("Judging fates...".into()).into());
                actions.push(narrate("The AI is deciding who lives and who dies..."));
            }
            ServerEvent::JudgmentResult {
                player,
                survived,
                item,
                story,
            } => {
                if let Some(game) = self.view.game.as_mut() {
                    let verdict = if survived { "survived!" } else { "died..." };
                    actions.push(RenderInstruction::Log(format!("{player}: {verdict}")).into());
                    game.round.judgments.push(JudgmentOutcome {
                        player,
                        survived,
                        item,
                        story,
                    });
                    actions.push(RenderInstruction::JudgmentResults(game.round.judgments.clone()).into());
                }
            }
            ServerEvent::RoundEnd { scores, .. } => {
                if let Some(game) = self.view.game.as_mut() {
                    for entry in &scores {
                        apply_score(game, &entry.name, entry.score);
                    }
                    game.phase = Some(Phase::RoundEnd);
                    actions.push(RenderInstruction::Phase(game.phase).into());
                    actions.push(RenderInstruction::RoundScores(scores).into());
                    actions.push(RenderInstruction::Roster(game.roster.clone()).into());
                }
            }
            ServerEvent::GameOver {
                rankings,
                tiebreaker_reason,
            } => {
                if let Some(game) = self.view.game.as_mut() {
                    for ranking in &rankings {
                        apply_score(game, &ranking.name, ranking.score);
                    }
                    let standings = FinalStandings {
                        rankings,
                        tiebreaker_reason,
                    };
                    game.phase = Some(Phase::GameOver);
                    actions.push(RenderInstruction::Phase(game.phase).into());
                    actions.push(RenderInstruction::FinalStandings(standings.clone()).into());
                    actions.push(RenderInstruction::Roster(game.roster.clone()).into());
                    game.standings = Some(standings);
                }
            }
            ServerEvent::PlayerLeft { player, message } => {
                self.on_player_left(player, message, &mut actions);
            }
            ServerEvent::Unknown => {}
        }
        self.sync_link();
        actions
    }

    // ── Event validity ──────────────────────────────────────────────

    fn accepts(&self, event: &ServerEvent) -> bool {
        if !self.lifecycle.is_open() {
            return false;
        }
        let matching_event = matches!(
            event,
            ServerEvent::Connected { .. }
                | ServerEvent::MatchingStarted { .. }
                | ServerEvent::MatchingCancelled
                | ServerEvent::GameStarting { .. }
        );
        match self.view.screen {
            Screen::Home => false,
            Screen::Matching => matching_event,
            Screen::Game => !matching_event && !matches!(event, ServerEvent::Unknown),
        }
    }

    // ── Server event handlers ───────────────────────────────────────

    fn on_connected(
        &mut self,
        player_id: String,
        message: Option<String>,
        actions: &mut Vec<Action>,
    ) {
        if self.view.player_id.is_some() {
            debug!("duplicate connected event ignored");
            return;
        }
        info!(player_id = %player_id, "server assigned player identity");
        self.view.player_id = Some(player_id);
        if let Some(message) = message {
            actions.push(RenderInstruction::Log(message).into());
        }
        let start = match self.view.mode {
            Mode::Solo => ClientMessage::StartSolo,
            Mode::Multiplayer => ClientMessage::StartMatching,
        };
        self.send(start, actions);
    }

    fn on_game_starting(
        &mut self,
        players: Vec<PlayerSummary>,
        room_id: Option<String>,
        actions: &mut Vec<Action>,
    ) {
        self.stop_countdown(actions);
        let roster: Vec<RosterEntry> = players
            .into_iter()
            .map(|player| RosterEntry {
                name: player.name,
                is_bot: player.is_bot,
                score: 0,
                holding_item: false,
            })
            .collect();
        info!(players = roster.len(), "game starting");

        actions.push(RenderInstruction::Roster(roster.clone()).into());
        self.view.game = Some(GameView::new(roster, room_id));
        self.view.screen = Screen::Game;
        actions.push(RenderInstruction::Screen(Screen::Game).into());
        actions.push(RenderInstruction::Phase(None).into());
        actions.push(RenderInstruction::Log("The game begins!".into()).into());
    }

    fn on_round_start(&mut self, round: u32, max_rounds: u32, actions: &mut Vec<Action>) {
        let Some(game) = self.view.game.as_mut() else {
            return;
        };
        game.round.round = round;
        game.round.max_rounds = max_rounds;
        game.round.clear_transient();
        game.phase = None;
        for entry in &mut game.roster {
            entry.holding_item = false;
        }

        actions.push(RenderInstruction::RoundCounter { round, max_rounds }.into());
        actions.push(RenderInstruction::PhaseLabel(format!("Round {round}")).into());
        actions.push(RenderInstruction::Phase(None).into());
        actions.push(keyword_render(&game.round.keywords));
        actions.push(RenderInstruction::Items(Vec::new()).into());
        actions.push(RenderInstruction::JudgmentResults(Vec::new()).into());
        actions.push(RenderInstruction::Commentary(None).into());
        actions.push(RenderInstruction::Roster(game.roster.clone()).into());
        actions.push(narrate(&format!("Round {round} begins! Are you ready?")));
        actions.push(RenderInstruction::Log(format!("Round {round} started")).into());
    }

    fn on_phase_change(
        &mut self,
        phase: Phase,
        items: Option<Vec<ItemInfo>>,
        actions: &mut Vec<Action>,
    ) {
        if phase == Phase::Unrecognized {
            debug!("ignoring phase change to an unrecognized phase");
            return;
        }
        let Some(game) = self.view.game.as_mut() else {
            return;
        };
        game.phase = Some(phase);

        if phase == Phase::Scavenge {
            let mut offered: Vec<(usize, ItemInfo)> = items
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(position, item)| (item.index.unwrap_or(position), item))
                .collect();
            // `item_grabbed` addresses slots by the server's index.
            offered.sort_by_key(|(index, _)| *index);
            game.round.items = offered
                .into_iter()
                .map(|(_, item)| ItemSlot {
                    name: item.name,
                    tier: item.tier,
                    grabbed_by: None,
                })
                .collect();
            actions.push(RenderInstruction::Items(game.round.items.clone()).into());
        }

        actions.push(RenderInstruction::Phase(Some(phase)).into());
        actions.push(RenderInstruction::PhaseLabel(phase.label().into()).into());
        let line = match phase {
            Phase::CrisisSetup => Some("Pick one keyword to feed the crisis..."),
            Phase::Scavenge => Some("Grab an item, fast! Slow hands get nothing!"),
            Phase::Judgment => Some("Fate is about to be revealed..."),
            _ => None,
        };
        if let Some(line) = line {
            actions.push(narrate(line));
        }
    }

    fn on_item_grabbed(
        &mut self,
        item_index: usize,
        player: String,
        item_name: String,
        comment: String,
        actions: &mut Vec<Action>,
    ) {
        let local_name = self.view.display_name.clone();
        let Some(game) = self.view.game.as_mut() else {
            return;
        };
        let Some(slot) = game.round.items.get_mut(item_index) else {
            debug!(item_index, "item_grabbed for a slot that is not on the grid");
            return;
        };
        if slot.is_grabbed() {
            debug!(item_index, "duplicate item_grabbed ignored");
            return;
        }
        slot.grabbed_by = Some(player.clone());
        if let Some(entry) = game.roster_entry_mut(&player) {
            entry.holding_item = true;
        }

        actions.push(RenderInstruction::Items(game.round.items.clone()).into());
        actions.push(RenderInstruction::Roster(game.roster.clone()).into());
        actions.push(RenderInstruction::Log(format!("{player} grabbed {item_name}!")).into());
        if player == local_name {
            let commentary = Commentary {
                player,
                item_name,
                comment,
            };
            game.round.commentary = Some(commentary.clone());
            actions.push(RenderInstruction::Commentary(Some(commentary)).into());
        }
    }

    /// The server hands a departed player's seat to a bot named
    /// `[AI] {player}` that keeps the score. Rename the entry in place so later
    /// score payloads still land on the seat.
    fn on_player_left(&mut self, player: String, message: String, actions: &mut Vec<Action>) {
        if let Some(game) = self.view.game.as_mut() {
            match game.roster_entry_mut(&player) {
                Some(entry) => {
                    entry.name = bot_seat_name(&player);
                    entry.is_bot = true;
                    actions.push(RenderInstruction::Roster(game.roster.clone()).into());
                }
                None => debug!(player = %player, "player_left for a player not on the roster"),
            }
        }
        let line = if message.is_empty() {
            format!("{player} left; a bot took over")
        } else {
            message
        };
        actions.push(RenderInstruction::Log(line).into());
    }

    // ── User intent handlers ────────────────────────────────────────

    fn enter_name(&mut self, name: String) {
        if self.lifecycle.live().is_some() {
            debug!("display name is fixed while a connection is live");
            return;
        }
        self.view.display_name = name;
    }

    fn start(&mut self, mode: Mode, actions: &mut Vec<Action>) {
        let trimmed = self.view.display_name.trim();
        let name = if trimmed.is_empty() {
            self.settings.default_player_name.clone()
        } else {
            trimmed.to_string()
        };

        let connection = ConnectionId::new();
        if let Some(superseded) = self.lifecycle.begin(connection) {
            debug!(%superseded, "closing previous connection before starting over");
            actions.push(Action::Close {
                connection: superseded,
            });
        }
        self.stop_countdown(actions);

        self.view.display_name = name;
        self.view.mode = mode;
        self.view.player_id = None;
        self.view.queue_size = None;
        self.view.home_hint = None;
        self.view.game = None;
        self.view.screen = Screen::Matching;

        actions.push(RenderInstruction::HomeHint(None).into());
        actions.push(RenderInstruction::Screen(Screen::Matching).into());
        actions.push(RenderInstruction::MatchingPanel { mode }.into());
        if mode == Mode::Multiplayer {
            let seconds = self.settings.matching_countdown;
            self.view.countdown = Some(seconds);
            actions.push(RenderInstruction::Countdown(seconds).into());
            actions.push(Action::StartCountdown);
        }

        let url = connection_url(&self.settings.server_url, &self.view.display_name);
        info!(%connection, ?mode, "starting session");
        actions.push(Action::Connect { connection, url });
    }

    fn cancel_matching(&mut self, actions: &mut Vec<Action>) {
        if self.view.screen != Screen::Matching {
            debug!(screen = ?self.view.screen, "cancel ignored outside matching");
            return;
        }
        self.stop_countdown(actions);
        if self.view.mode == Mode::Multiplayer {
            self.send(ClientMessage::CancelMatching, actions);
        }
        if let Some(connection) = self.lifecycle.close_intentionally() {
            actions.push(Action::Close { connection });
        }
        self.go_home(actions);
    }

    fn choose_keyword(&mut self, index: usize, actions: &mut Vec<Action>) {
        let choice = {
            let Some(game) = self.view.game.as_mut() else {
                return;
            };
            if game.phase != Some(Phase::CrisisSetup) || game.round.keywords.chosen.is_some() {
                debug!(index, "keyword choice not available");
                return;
            }
            let Some(choice) = game.round.keywords.options.get(index).cloned() else {
                debug!(index, "keyword index out of range");
                return;
            };
            game.round.keywords.chosen = Some(index);
            actions.push(keyword_render(&game.round.keywords));
            choice
        };
        actions.push(narrate(&format!(
            "You chose \"{choice}\". Waiting for the other players..."
        )));
        actions.push(RenderInstruction::Log(format!("You chose: {choice}")).into());
        self.send(ClientMessage::KeywordChoice { choice }, actions);
    }

    fn grab_item(&mut self, index: usize, actions: &mut Vec<Action>) {
        let available = self.view.game.as_ref().is_some_and(|game| {
            game.phase == Some(Phase::Scavenge)
                && game
                    .round
                    .items
                    .get(index)
                    .is_some_and(|slot| !slot.is_grabbed())
        });
        if !available {
            debug!(index, "grab ignored: slot not available");
            return;
        }
        actions.push(narrate("Grab requested, waiting for the server..."));
        self.send(ClientMessage::GrabItem { index }, actions);
    }

    fn request_exit(&mut self, actions: &mut Vec<Action>) {
        if let Some(game) = self.view.game.as_mut() {
            if !game.confirming_exit {
                game.confirming_exit = true;
                actions.push(RenderInstruction::ConfirmExit(true).into());
            }
        }
    }

    fn dismiss_exit(&mut self, actions: &mut Vec<Action>) {
        if let Some(game) = self.view.game.as_mut() {
            if game.confirming_exit {
                game.confirming_exit = false;
                actions.push(RenderInstruction::ConfirmExit(false).into());
            }
        }
    }

    fn confirm_exit(&mut self, actions: &mut Vec<Action>) {
        let confirming = self
            .view
            .game
            .as_ref()
            .is_some_and(|game| game.confirming_exit);
        if !confirming {
            debug!("exit confirmation without a pending request");
            return;
        }
        self.send(ClientMessage::ExitGame, actions);
        if let Some(connection) = self.lifecycle.close_intentionally() {
            actions.push(Action::Close { connection });
        }
        actions.push(RenderInstruction::ConfirmExit(false).into());
        self.go_home(actions);
        actions.push(RenderInstruction::Log("You left the game".into()).into());
    }

    fn play_again(&mut self, actions: &mut Vec<Action>) {
        if self.view.screen != Screen::Game {
            debug!(screen = ?self.view.screen, "play again ignored outside the game screen");
            return;
        }
        if let Some(connection) = self.lifecycle.close_intentionally() {
            actions.push(Action::Close { connection });
        }
        self.go_home(actions);
    }

    // ── Link handlers ───────────────────────────────────────────────

    fn on_closed(
        &mut self,
        connection: ConnectionId,
        diagnostic: Diagnostic,
        actions: &mut Vec<Action>,
    ) {
        match self.lifecycle.on_closed(connection) {
            None => debug!(%connection, "close report for superseded connection"),
            Some(CloseKind::Intentional) => {
                debug!(%connection, "connection closed on request");
                actions.push(Action::Close { connection });
            }
            Some(CloseKind::Unintentional) => {
                actions.push(Action::Close { connection });
                self.surface(diagnostic, actions);
            }
        }
    }

    fn countdown_tick(&mut self, actions: &mut Vec<Action>) {
        let counting = self.view.screen == Screen::Matching && self.view.mode == Mode::Multiplayer;
        match self.view.countdown {
            Some(remaining) if counting && remaining > 0 => {
                let remaining = remaining - 1;
                self.view.countdown = Some(remaining);
                actions.push(RenderInstruction::Countdown(remaining).into());
                if remaining == 0 {
                    actions.push(Action::StopCountdown);
                }
            }
            _ => actions.push(Action::StopCountdown),
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    /// Queue `message` if the connection is open; otherwise drop it.
    fn send(&self, message: ClientMessage, actions: &mut Vec<Action>) {
        if self.lifecycle.is_open() {
            actions.push(Action::Send(message));
        } else {
            debug!(tag = message.tag(), "dropping intent: no open connection");
        }
    }

    fn surface(&mut self, diagnostic: Diagnostic, actions: &mut Vec<Action>) {
        warn!(?diagnostic, screen = ?self.view.screen, "connectivity failure");
        let hint = diagnostic.message().to_string();
        self.view.home_hint = Some(hint.clone());
        actions.push(RenderInstruction::HomeHint(Some(hint)).into());
        actions.push(RenderInstruction::Alert(diagnostic).into());
        self.go_home(actions);
    }

    fn stop_countdown(&mut self, actions: &mut Vec<Action>) {
        self.view.countdown = None;
        actions.push(Action::StopCountdown);
    }

    fn go_home(&mut self, actions: &mut Vec<Action>) {
        self.stop_countdown(actions);
        self.view.screen = Screen::Home;
        self.view.game = None;
        self.view.player_id = None;
        self.view.queue_size = None;
        actions.push(RenderInstruction::Screen(Screen::Home).into());
    }

    fn sync_link(&mut self) {
        self.view.link = self.lifecycle.state();
    }
}

fn narrate(text: &str) -> Action {
    RenderInstruction::Narrator(text.to_string()).into()
}

fn keyword_render(pick: &KeywordPick) -> Action {
    RenderInstruction::KeywordOptions {
        options: pick.options.clone(),
        chosen: pick.chosen,
    }
    .into()
}

/// Name the server gives the bot that takes over `player`'s seat.
fn bot_seat_name(player: &str) -> String {
    format!("[AI] {player}")
}

/// Overwrite the roster score for `name` with the server's value.
fn apply_score(game: &mut GameView, name: &str, score: i64) {
    match game.roster_entry_mut(name) {
        Some(entry) => entry.score = score,
        None => debug!(player = %name, "score for a player not on the roster"),
    }
}

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

    fn machine() -> SessionMachine {
        SessionMachine::new(SessionSettings::new("ws://127.0.0.1:8000"))
    }

    fn connect_id(actions: &[Action]) -> ConnectionId {
        actions
            .iter()
            .find_map(|action| match action {
                Action::Connect { connection, .. } => Some(*connection),
                _ => None,
            })
            .expect("start should emit Connect")
    }

    #[test]
    fn connection_url_encodes_name_as_one_segment() {
        assert_eq!(
            connection_url("ws://host:8000/", "Ann Lee/2"),
            "ws://host:8000/ws/Ann%20Lee%2F2"
        );
        assert_eq!(connection_url("ws://h", "玩家"), "ws://h/ws/%E7%8E%A9%E5%AE%B6");
    }

    #[test]
    fn blank_name_falls_back_to_default() {
        let mut machine = machine();
        machine.handle_intent(UserIntent::EnterName("   ".into()));
        let actions = machine.handle_intent(UserIntent::StartSolo);
        assert_eq!(machine.view().display_name, DEFAULT_PLAYER_NAME);
        assert!(actions.iter().any(|action| matches!(
            action,
            Action::Connect { url, .. } if url.ends_with("/ws/Anonymous")
        )));
    }

    #[test]
    fn name_is_trimmed_and_locked_while_live() {
        let mut machine = machine();
        machine.handle_intent(UserIntent::EnterName("  Alice ".into()));
        machine.handle_intent(UserIntent::StartSolo);
        assert_eq!(machine.view().display_name, "Alice");

        machine.handle_intent(UserIntent::EnterName("Mallory".into()));
        assert_eq!(machine.view().display_name, "Alice");
    }

    #[test]
    fn multiplayer_start_arms_countdown_solo_does_not() {
        let mut machine = machine();
        let actions = machine.handle_intent(UserIntent::StartMatching);
        assert!(actions.contains(&Action::StartCountdown));
        assert_eq!(machine.view().countdown, Some(DEFAULT_MATCHING_COUNTDOWN));

        let mut solo = self::machine();
        let actions = solo.handle_intent(UserIntent::StartSolo);
        assert!(!actions.contains(&Action::StartCountdown));
        assert_eq!(solo.view().countdown, None);
    }

    #[test]
    fn countdown_stops_at_zero() {
        let mut machine = SessionMachine::new(SessionSettings {
            matching_countdown: 2,
            ..SessionSettings::new("ws://h")
        });
        machine.handle_intent(UserIntent::StartMatching);

        let actions = machine.handle_link(LinkEvent::CountdownTick);
        assert_eq!(machine.view().countdown, Some(1));
        assert!(!actions.contains(&Action::StopCountdown));

        let actions = machine.handle_link(LinkEvent::CountdownTick);
        assert_eq!(machine.view().countdown, Some(0));
        assert!(actions.contains(&Action::StopCountdown));

        let actions = machine.handle_link(LinkEvent::CountdownTick);
        assert_eq!(machine.view().countdown, Some(0));
        assert_eq!(actions, vec![Action::StopCountdown]);
    }

    #[test]
    fn tick_outside_matching_stops_timer() {
        let mut machine = machine();
        let actions = machine.handle_link(LinkEvent::CountdownTick);
        assert_eq!(actions, vec![Action::StopCountdown]);
    }

    #[test]
    fn intents_before_open_are_dropped() {
        let mut machine = machine();
        let actions = machine.handle_intent(UserIntent::StartMatching);
        let connection = connect_id(&actions);

        // Still connecting: cancel must not try to send.
        let actions = machine.handle_intent(UserIntent::CancelMatching);
        assert!(!actions.iter().any(|a| matches!(a, Action::Send(_))));
        assert!(actions.contains(&Action::Close { connection }));
        assert_eq!(machine.view().screen, Screen::Home);
    }

    #[test]
    fn late_open_for_superseded_connection_is_closed() {
        let mut machine = machine();
        let first = connect_id(&machine.handle_intent(UserIntent::StartSolo));
        let second = connect_id(&machine.handle_intent(UserIntent::StartSolo));
        assert_ne!(first, second);

        let actions = machine.handle_link(LinkEvent::Opened(first));
        assert_eq!(actions, vec![Action::Close { connection: first }]);
        assert!(!machine.lifecycle().is_open());

        machine.handle_link(LinkEvent::Opened(second));
        assert!(machine.lifecycle().is_open());
    }

    #[test]
    fn connect_failure_surfaces_diagnostic() {
        let mut machine = machine();
        let connection = connect_id(&machine.handle_intent(UserIntent::StartSolo));
        let actions = machine.handle_link(LinkEvent::ConnectFailed(connection));
        assert!(actions.contains(&Action::Render(RenderInstruction::Alert(
            Diagnostic::ConnectFailed
        ))));
        assert_eq!(machine.view().screen, Screen::Home);
        assert_eq!(
            machine.view().home_hint.as_deref(),
            Some(Diagnostic::ConnectFailed.message())
        );
    }

    #[test]
    fn restart_clears_home_hint() {
        let mut machine = machine();
        let connection = connect_id(&machine.handle_intent(UserIntent::StartSolo));
        machine.handle_link(LinkEvent::HandshakeTimeout(connection));
        assert!(machine.view().home_hint.is_some());

        let actions = machine.handle_intent(UserIntent::StartSolo);
        assert!(machine.view().home_hint.is_none());
        assert!(actions.contains(&Action::Render(RenderInstruction::HomeHint(None))));
    }
}
