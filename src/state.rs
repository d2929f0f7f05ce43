//! Client-visible session state.
//!
//! [`SessionView`] is everything the view layer needs to draw the current
//! screen. It is owned and mutated only by
//! [`SessionMachine`](crate::session::SessionMachine); everyone else sees
//! snapshots.

use crate::lifecycle::LinkState;
use crate::protocol::{ItemTier, Phase, PlayerId, Ranking};

/// Top-level UI mode. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Entry screen: name entry and start buttons.
    #[default]
    Home,
    /// Waiting for a game (queueing, or preparing a solo game).
    Matching,
    /// A game is running.
    Game,
}

/// How the session was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One human against bots; starts immediately.
    #[default]
    Solo,
    /// Queue with other humans.
    Multiplayer,
}

/// One player in the running game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub is_bot: bool,
    /// Last authoritative score. Never incremented locally.
    pub score: i64,
    /// Set once the player grabbed an item this round.
    pub holding_item: bool,
}

/// An item card in the scavenge grid, addressed by its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSlot {
    pub name: String,
    pub tier: ItemTier,
    /// Who claimed the item. Once set it never changes within the round.
    pub grabbed_by: Option<String>,
}

impl ItemSlot {
    pub fn is_grabbed(&self) -> bool {
        self.grabbed_by.is_some()
    }
}

/// The pickup remark shown after the local player grabs an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    pub player: String,
    pub item_name: String,
    pub comment: String,
}

/// One survival verdict announced during judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgmentOutcome {
    pub player: String,
    pub survived: bool,
    pub item: String,
    pub story: String,
}

/// This round's crisis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crisis {
    pub name: String,
    pub scenario: String,
    /// The keywords the players contributed, when the server reports them.
    pub keywords: Vec<String>,
}

/// Keyword choices offered in crisis setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordPick {
    pub options: Vec<String>,
    /// Index into `options` of the submitted choice. Selection is locked once set.
    pub chosen: Option<usize>,
}

/// Round counters plus every piece of state that lives for one round only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
    pub round: u32,
    pub max_rounds: u32,
    pub keywords: KeywordPick,
    pub crisis: Option<Crisis>,
    pub items: Vec<ItemSlot>,
    pub judgments: Vec<JudgmentOutcome>,
    /// At most one commentary is visible; the most recent wins.
    pub commentary: Option<Commentary>,
}

impl RoundState {
    /// Drop everything that belonged to the previous round.
    pub(crate) fn clear_transient(&mut self) {
        self.keywords = KeywordPick::default();
        self.crisis = None;
        self.items.clear();
        self.judgments.clear();
        self.commentary = None;
    }
}

/// Final standings from `game_over`, in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalStandings {
    pub rankings: Vec<Ranking>,
    pub tiebreaker_reason: Option<String>,
}

/// Game-screen state. Exists exactly while the screen is [`Screen::Game`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub room_id: Option<String>,
    /// The visible phase panel; `None` between `round_start` and the next phase.
    pub phase: Option<Phase>,
    /// Fixed at `game_starting`; entries are updated in place by name.
    pub roster: Vec<RosterEntry>,
    pub round: RoundState,
    pub standings: Option<FinalStandings>,
    /// An exit was requested and awaits confirmation.
    pub confirming_exit: bool,
}

impl GameView {
    pub(crate) fn new(roster: Vec<RosterEntry>, room_id: Option<String>) -> Self {
        Self {
            room_id,
            phase: None,
            roster,
            round: RoundState::default(),
            standings: None,
            confirming_exit: false,
        }
    }

    pub(crate) fn roster_entry_mut(&mut self, name: &str) -> Option<&mut RosterEntry> {
        self.roster.iter_mut().find(|entry| entry.name == name)
    }

    /// Roster entry for `name`, if present.
    pub fn roster_entry(&self, name: &str) -> Option<&RosterEntry> {
        self.roster.iter().find(|entry| entry.name == name)
    }
}

/// Snapshot of everything the view layer draws.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub screen: Screen,
    pub mode: Mode,
    /// Provisional until the server confirms the connection.
    pub display_name: String,
    /// Assigned by the server in `connected`.
    pub player_id: Option<PlayerId>,
    pub link: LinkState,
    pub queue_size: Option<u32>,
    /// Cosmetic matching countdown, in seconds remaining.
    pub countdown: Option<u32>,
    /// Connectivity diagnostic shown on the home screen.
    pub home_hint: Option<String>,
    pub game: Option<GameView>,
}

impl SessionView {
    /// The active phase. Always `None` outside the game screen.
    pub fn phase(&self) -> Option<Phase> {
        match self.screen {
            Screen::Game => self.game.as_ref().and_then(|game| game.phase),
            Screen::Home | Screen::Matching => None,
        }
    }
}
